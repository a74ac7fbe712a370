use wage_clock::adapters::{MemoryDom, NodeId};
use wage_clock::domain::ports::PriceDom;
use wage_clock::{PriceReplacer, Settings, SiteConfig};

struct ProductPage {
    dom: MemoryDom,
    config: SiteConfig,
    feature: NodeId,
    results: NodeId,
}

impl ProductPage {
    fn new() -> Self {
        let config = SiteConfig::default();
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let feature = dom.create_element("div", &[]);
        dom.set_id(feature, "corePrice_feature_div");
        dom.append_child(body, feature);
        let results = dom.create_element("div", &[]);
        dom.append_child(body, results);
        Self {
            dom,
            config,
            feature,
            results,
        }
    }

    fn widget(&mut self, parent: NodeId, symbol: &str, whole: &str, fraction: &str) -> NodeId {
        self.dom
            .append_price_widget(parent, &self.config.selectors, symbol, whole, fraction)
    }

    fn shown(&self, container: NodeId) -> String {
        self.dom.visible_text(container, &["a-offscreen"])
    }
}

fn wage(hourly: f64) -> Settings {
    Settings::new(Some(hourly), 8.0)
}

#[test]
fn test_product_page_is_converted() {
    let mut page = ProductPage::new();
    let (feature, results) = (page.feature, page.results);
    let main_price = page.widget(feature, "$", "24", "00");
    let bare = page.dom.append_bare_price(feature, "a-offscreen", "$120.00");
    let big = page.widget(results, "$", "48,000", "00");
    let replacer = PriceReplacer::new(&page.config);

    let report = replacer.apply(&mut page.dom, &wage(20.0));

    assert_eq!(report.containers, 2);
    assert_eq!(report.standalone, 1);
    assert_eq!(report.converted, 3);
    assert_eq!(page.shown(main_price), "1h 12m");
    assert_eq!(page.dom.text_content(bare), "6h");
    // 300 workdays: 60 weeks, 15 months
    assert_eq!(page.shown(big), "1y 3mo");
}

#[test]
fn test_european_decimal_comma() {
    let mut page = ProductPage::new();
    let results = page.results;
    let container = page.dom.create_element("span", &["a-price"]);
    page.dom.append_child(results, container);
    page.dom.append_text(container, "1.999,00 €");
    let replacer = PriceReplacer::new(&page.config);

    replacer.apply(&mut page.dom, &wage(1999.0));

    assert_eq!(page.dom.text_content(container), "1h");
}

#[test]
fn test_second_pass_writes_nothing() {
    let mut page = ProductPage::new();
    let feature = page.feature;
    page.widget(feature, "$", "24", "00");
    page.dom.append_bare_price(feature, "a-offscreen", "$120.00");
    let replacer = PriceReplacer::new(&page.config);

    let first = replacer.apply(&mut page.dom, &wage(12.0));
    let second = replacer.apply(&mut page.dom, &wage(12.0));

    assert_eq!(first.converted, 2);
    assert_eq!(second.written(), 0);
    assert_eq!(second.unchanged, 2);
}

#[test]
fn test_wage_change_reads_the_pristine_price() {
    let mut page = ProductPage::new();
    let results = page.results;
    let container = page.widget(results, "$", "24", "00");
    let replacer = PriceReplacer::new(&page.config);

    replacer.apply(&mut page.dom, &wage(12.0));
    assert_eq!(page.shown(container), "2h");

    replacer.apply(&mut page.dom, &wage(24.0));
    assert_eq!(page.shown(container), "1h");
    assert_eq!(
        replacer.pristine_copy(&page.dom, container).unwrap().source,
        "$24.00"
    );
}

#[test]
fn test_clearing_the_wage_restores_prices() {
    let mut page = ProductPage::new();
    let feature = page.feature;
    let container = page.widget(feature, "$", "24", "00");
    let bare = page.dom.append_bare_price(feature, "a-offscreen", "$120.00");
    let replacer = PriceReplacer::new(&page.config);

    replacer.apply(&mut page.dom, &wage(12.0));
    let report = replacer.apply(&mut page.dom, &Settings::default());

    assert_eq!(report.restored, 2);
    assert_eq!(page.shown(container), "$24.00");
    assert_eq!(page.dom.text_content(bare), "$120.00");
    let offscreen = page.dom.find_in(container, "a-offscreen").unwrap();
    assert_eq!(page.dom.text_content(offscreen), "$24.00");
    assert!(replacer.current_label(&page.dom, container).is_none());

    // nothing left to restore
    let again = replacer.apply(&mut page.dom, &Settings::default());
    assert_eq!(again.written(), 0);
}

#[test]
fn test_standalone_sweep_is_scoped() {
    let mut page = ProductPage::new();
    let (feature, results) = (page.feature, page.results);
    let inside = page.dom.append_bare_price(feature, "a-offscreen", "$60.00");
    let outside = page.dom.append_bare_price(results, "a-offscreen", "$60.00");
    // a container's own hidden string is not a standalone price
    page.widget(feature, "$", "5", "00");
    let replacer = PriceReplacer::new(&page.config);

    let report = replacer.apply(&mut page.dom, &wage(10.0));

    assert_eq!(report.standalone, 1);
    assert_eq!(page.dom.text_content(inside), "6h");
    assert_eq!(page.dom.text_content(outside), "$60.00");
}

#[test]
fn test_elements_added_later_are_picked_up() {
    let mut page = ProductPage::new();
    let results = page.results;
    let first = page.widget(results, "$", "24", "00");
    let replacer = PriceReplacer::new(&page.config);
    replacer.apply(&mut page.dom, &wage(12.0));

    let later = page.widget(results, "$", "6", "00");
    let report = replacer.apply(&mut page.dom, &wage(12.0));

    assert_eq!(report.converted, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(page.shown(first), "2h");
    assert_eq!(page.shown(later), "30m");
}
