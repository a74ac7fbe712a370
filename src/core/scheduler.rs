/// Whether a replacement pass is waiting for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleState {
    #[default]
    Idle,
    Scheduled,
}

/// Frame gate: any number of requests between two frame boundaries collapse
/// into a single pass.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    state: ScheduleState,
    requests: u64,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only when this request moved the gate from idle to
    /// scheduled, i.e. when the caller has to wait for a frame.
    pub fn request(&mut self) -> bool {
        self.requests += 1;
        match self.state {
            ScheduleState::Idle => {
                self.state = ScheduleState::Scheduled;
                true
            }
            ScheduleState::Scheduled => false,
        }
    }

    /// Frame boundary. Returns `true` when a pass must run now; the gate is
    /// idle again before the pass starts, so requests made during the pass
    /// schedule the next frame.
    pub fn take_frame(&mut self) -> bool {
        match self.state {
            ScheduleState::Scheduled => {
                self.state = ScheduleState::Idle;
                self.frames += 1;
                true
            }
            ScheduleState::Idle => false,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == ScheduleState::Scheduled
    }

    /// Total requests seen, coalesced or not.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Frames that ran a pass.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
