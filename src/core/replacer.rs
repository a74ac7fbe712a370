use crate::config::site_config::{ScopedSelector, Selectors, SiteConfig, StampConfig};
use crate::core::duration::format_duration;
use crate::core::parser::parse_price;
use crate::domain::model::{PassReport, PristineCopy, Settings};
use crate::domain::ports::PriceDom;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
struct PriceParts<N> {
    whole: Option<N>,
    fraction: Option<N>,
    symbol: Option<N>,
    offscreen: Option<N>,
}

#[derive(Debug, Clone, Copy)]
enum Target<N> {
    Container { node: N, parts: PriceParts<N> },
    Bare(N),
}

impl<N: Copy> Target<N> {
    fn node(&self) -> N {
        match self {
            Target::Container { node, .. } => *node,
            Target::Bare(node) => *node,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Converted,
    Unchanged,
    Restored,
    Skipped,
}

impl Outcome {
    fn record(self, report: &mut PassReport) {
        match self {
            Outcome::Converted => report.converted += 1,
            Outcome::Unchanged => report.unchanged += 1,
            Outcome::Restored => report.restored += 1,
            Outcome::Skipped => report.skipped += 1,
        }
    }
}

/// Finds price elements and swaps their display for work-time labels.
///
/// Every element is stamped with its pristine copy right before the first
/// write; from then on the price is always parsed from that copy, never
/// from what is currently displayed.
#[derive(Debug, Clone)]
pub struct PriceReplacer {
    selectors: Selectors,
    standalone: Vec<ScopedSelector>,
    stamp: StampConfig,
}

impl PriceReplacer {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            selectors: config.selectors.clone(),
            standalone: config.standalone.clone(),
            stamp: config.stamp.clone(),
        }
    }

    /// One full pass over the document with a fixed settings snapshot.
    pub fn apply<D: PriceDom>(&self, dom: &mut D, settings: &Settings) -> PassReport {
        let mut report = PassReport::default();

        let containers = dom.elements_by_class(&self.selectors.price_container);
        tracing::debug!("Found {} price containers", containers.len());
        for node in containers {
            report.containers += 1;
            let parts = self.locate_parts(&*dom, node);
            self.settle(dom, Target::Container { node, parts }, settings)
                .record(&mut report);
        }

        let bare = self.standalone_nodes(&*dom);
        tracing::debug!("Found {} standalone price elements", bare.len());
        for node in bare {
            report.standalone += 1;
            self.settle(dom, Target::Bare(node), settings)
                .record(&mut report);
        }

        report
    }

    /// Pristine copy stored on `node`, if it has been stamped.
    pub fn pristine_copy<D: PriceDom>(&self, dom: &D, node: D::Node) -> Option<PristineCopy> {
        let raw = dom.attribute(node, &self.stamp.original_attribute)?;
        match serde_json::from_str(&raw) {
            Ok(copy) => Some(copy),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable {} on {:?}: {}",
                    self.stamp.original_attribute,
                    node,
                    e
                );
                None
            }
        }
    }

    /// Label last written to `node`.
    pub fn current_label<D: PriceDom>(&self, dom: &D, node: D::Node) -> Option<String> {
        dom.attribute(node, &self.stamp.label_attribute)
    }

    fn locate_parts<D: PriceDom>(&self, dom: &D, container: D::Node) -> PriceParts<D::Node> {
        PriceParts {
            whole: dom.find_in(container, &self.selectors.whole),
            fraction: dom.find_in(container, &self.selectors.fraction),
            symbol: dom.find_in(container, &self.selectors.symbol),
            offscreen: dom.find_in(container, &self.selectors.offscreen),
        }
    }

    /// Bare price strings under the configured scopes that no container owns.
    fn standalone_nodes<D: PriceDom>(&self, dom: &D) -> Vec<D::Node> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for scoped in &self.standalone {
            for node in dom.elements_by_class_in_scope(&scoped.scope_id, &scoped.class) {
                if dom.has_ancestor_with_class(node, &self.selectors.price_container) {
                    continue;
                }
                if seen.insert(node) {
                    nodes.push(node);
                }
            }
        }
        nodes
    }

    fn settle<D: PriceDom>(
        &self,
        dom: &mut D,
        target: Target<D::Node>,
        settings: &Settings,
    ) -> Outcome {
        let node = target.node();
        let stored = self.pristine_copy(&*dom, node);
        let pristine = match &stored {
            Some(copy) => copy.clone(),
            None => capture(&*dom, &target),
        };

        let Some(price) = parse_price(&pristine.source) else {
            tracing::trace!("Not a price: {:?}", pristine.source);
            return Outcome::Skipped;
        };

        let label_attr = self.stamp.label_attribute.as_str();
        match format_duration(price, settings.hourly_wage, settings.daily_hours) {
            Some(label) => {
                if stored.is_none() {
                    self.stamp_pristine(dom, node, &pristine);
                }
                let wrote = write_label(dom, &target, &label);
                let relabeled = dom.attribute(node, label_attr).as_deref() != Some(label.as_str());
                if relabeled {
                    dom.set_attribute(node, label_attr, &label);
                }
                if wrote || relabeled {
                    Outcome::Converted
                } else {
                    Outcome::Unchanged
                }
            }
            None if stored.is_some() && dom.attribute(node, label_attr).is_some() => {
                restore(dom, &target, &pristine);
                dom.remove_attribute(node, label_attr);
                Outcome::Restored
            }
            None => Outcome::Skipped,
        }
    }

    fn stamp_pristine<D: PriceDom>(&self, dom: &mut D, node: D::Node, pristine: &PristineCopy) {
        match serde_json::to_string(pristine) {
            Ok(raw) => dom.set_attribute(node, &self.stamp.original_attribute, &raw),
            Err(e) => tracing::warn!("Could not encode pristine copy for {:?}: {}", node, e),
        }
    }
}

fn capture<D: PriceDom>(dom: &D, target: &Target<D::Node>) -> PristineCopy {
    match target {
        Target::Container { node, parts } => {
            let text = dom.text_content(*node);
            let offscreen = parts.offscreen.map(|n| dom.text_content(n));
            // the hidden full-precision string wins unless it is empty
            let source = offscreen
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| text.clone());
            PristineCopy {
                source,
                text,
                whole: parts.whole.map(|n| dom.text_content(n)),
                offscreen,
            }
        }
        Target::Bare(node) => {
            let text = dom.text_content(*node);
            PristineCopy {
                source: text.clone(),
                text,
                whole: None,
                offscreen: None,
            }
        }
    }
}

/// Sets the text of `node` unless it already reads `text`.
fn replace_text<D: PriceDom>(dom: &mut D, node: D::Node, text: &str) -> bool {
    if dom.text_content(node) == text {
        return false;
    }
    dom.set_text_content(node, text);
    true
}

fn write_label<D: PriceDom>(dom: &mut D, target: &Target<D::Node>, label: &str) -> bool {
    match target {
        Target::Container { node, parts } => match parts.whole {
            Some(whole) => {
                let mut wrote = replace_text(dom, whole, label);
                // a lone "2h" reads better than "2h.₹"
                for part in [parts.fraction, parts.symbol].into_iter().flatten() {
                    dom.set_hidden(part, true);
                }
                if let Some(offscreen) = parts.offscreen {
                    wrote |= replace_text(dom, offscreen, label);
                }
                wrote
            }
            None => replace_text(dom, *node, label),
        },
        Target::Bare(node) => replace_text(dom, *node, label),
    }
}

fn restore<D: PriceDom>(dom: &mut D, target: &Target<D::Node>, pristine: &PristineCopy) {
    match target {
        Target::Container { node, parts } => match (parts.whole, &pristine.whole) {
            (Some(whole), Some(text)) => {
                replace_text(dom, whole, text);
                for part in [parts.fraction, parts.symbol].into_iter().flatten() {
                    dom.set_hidden(part, false);
                }
                if let (Some(offscreen), Some(text)) = (parts.offscreen, &pristine.offscreen) {
                    replace_text(dom, offscreen, text);
                }
            }
            _ => {
                replace_text(dom, *node, &pristine.text);
            }
        },
        Target::Bare(node) => {
            replace_text(dom, *node, &pristine.text);
        }
    }
}
