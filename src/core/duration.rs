//! Work-time labels for an amount of money.
//!
//! The ladder runs from nanoseconds up to years. Units above hours are
//! work units: a day is `workday_hours`, a week is 5 workdays, a month is 4
//! weeks and a year is 12 months. Each tier derives its figures from the
//! tier below it, so rounding follows the chained units rather than raw
//! seconds.

const SECONDS_PER_HOUR: f64 = 3600.0;
const WORKDAYS_PER_WEEK: f64 = 5.0;
const WEEKS_PER_MONTH: f64 = 4.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Converts `price` into the work-time needed to earn it at `hourly_wage`.
///
/// Returns `None` when no positive wage is configured or the result is not
/// a positive finite duration.
pub fn format_duration(price: f64, hourly_wage: Option<f64>, workday_hours: f64) -> Option<String> {
    let wage = hourly_wage.filter(|w| *w > 0.0)?;
    let total_seconds = price / wage * SECONDS_PER_HOUR;
    format_seconds(total_seconds, workday_hours)
}

/// Formats a positive number of seconds on the tier ladder.
pub fn format_seconds(total_seconds: f64, workday_hours: f64) -> Option<String> {
    if !total_seconds.is_finite() || total_seconds <= 0.0 {
        return None;
    }

    if total_seconds < 1e-6 {
        return Some(format!("{:.2}ns", round_half_up(total_seconds * 1e9, 2)));
    }
    if total_seconds < 1e-3 {
        return Some(format!("{:.2}µs", round_half_up(total_seconds * 1e6, 2)));
    }
    if total_seconds < 1.0 {
        return Some(format!("{:.1}ms", round_half_up(total_seconds * 1e3, 1)));
    }
    if total_seconds < 60.0 {
        return Some(format!("{}s", total_seconds.round()));
    }

    let total_minutes = total_seconds / 60.0;
    if total_minutes < 60.0 {
        return Some(minutes_label(total_minutes));
    }

    let total_hours = total_minutes / 60.0;
    if total_hours < workday_hours {
        return Some(hours_label(total_hours));
    }

    let total_days = total_hours / workday_hours;
    if total_days < WORKDAYS_PER_WEEK {
        return Some(days_label(total_days, workday_hours));
    }

    let total_weeks = total_days / WORKDAYS_PER_WEEK;
    if total_weeks < WEEKS_PER_MONTH {
        return Some(compound(total_weeks, WORKDAYS_PER_WEEK, "w", "d"));
    }

    let total_months = total_weeks / WEEKS_PER_MONTH;
    if total_months < MONTHS_PER_YEAR {
        return Some(compound(total_months, WEEKS_PER_MONTH, "mo", "w"));
    }

    let total_years = total_months / MONTHS_PER_YEAR;
    Some(compound(total_years, MONTHS_PER_YEAR, "y", "mo"))
}

/// Rounds to `digits` decimals with ties away from zero; `{:.N}` alone
/// would round ties to even.
fn round_half_up(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

fn minutes_label(total_minutes: f64) -> String {
    let mins = total_minutes.floor();
    let secs = ((total_minutes - mins) * 60.0).round();
    // seconds only matter for short spans
    if secs > 0.0 && mins < 10.0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}m", total_minutes.round())
    }
}

fn hours_label(total_hours: f64) -> String {
    let hrs = total_hours.floor();
    let mins = ((total_hours - hrs) * 60.0).round();
    if mins > 0.0 {
        format!("{}h {}m", hrs, mins)
    } else {
        format!("{}h", hrs)
    }
}

fn days_label(total_days: f64, workday_hours: f64) -> String {
    let days = total_days.floor();
    let remaining_hours = (total_days - days) * workday_hours;
    let hrs = remaining_hours.floor();
    let mins = ((remaining_hours - hrs) * 60.0).round();

    let mut label = format!("{}d", days);
    if hrs > 0.0 {
        label.push_str(&format!(" {}h", hrs));
    }
    if mins > 0.0 && days < 2.0 {
        label.push_str(&format!(" {}m", mins));
    }
    label
}

/// `"{major}{unit}"` plus the rounded remainder in `base` sub-units when
/// that remainder is non-zero.
fn compound(total: f64, base: f64, unit: &str, sub_unit: &str) -> String {
    let major = total.floor();
    let minor = ((total - major) * base).round();
    if minor > 0.0 {
        format!("{}{} {}{}", major, unit, minor, sub_unit)
    } else {
        format!("{}{}", major, unit)
    }
}
