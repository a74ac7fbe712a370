use clap::Parser;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wage_clock::adapters::{JsonFileSettingsStore, MemoryDom, MemorySettingsStore, NodeId};
use wage_clock::config::Command;
use wage_clock::core::bridge::SettingsBridge;
use wage_clock::core::salary::{load_or_seed, save_salary, SalaryForm};
use wage_clock::domain::model::{StorageArea, STORAGE_KEY_HOURLY};
use wage_clock::domain::ports::{PriceDom, SettingsStore};
use wage_clock::utils::{logger, validation::Validate};
use wage_clock::{format_duration, parse_price, CliConfig, Result, Settings, SiteConfig, TimeEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting wage-clock CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(config.command).await {
        tracing::error!("❌ wage-clock failed: {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            prices,
            wage,
            hours,
            settings,
        } => convert(&prices, wage, hours, &settings).await,
        Command::Configure {
            amount,
            salary_type,
            hours,
            settings,
        } => {
            let store = JsonFileSettingsStore::open(&settings).await?;
            let form = SalaryForm::new(salary_type, amount, hours);
            let hourly = save_salary(&store, &form).await?;
            println!("✅ Saved! {:.2} per hour", hourly);
            println!("📁 Settings file: {}", store.path().display());
            Ok(())
        }
        Command::Show { settings } => {
            let store = JsonFileSettingsStore::open(&settings).await?;
            let form = load_or_seed(&store).await?;
            let current = SettingsBridge::new(Arc::new(store)).load().await?;
            println!("💼 Salary: {} ({})", form.salary_amount, form.salary_type);
            println!("🕒 Daily hours: {}", form.daily_hours);
            match current.hourly_wage {
                Some(wage) => println!("💰 Hourly wage: {:.2}", wage),
                None => println!("💰 Hourly wage: not set"),
            }
            Ok(())
        }
        Command::Demo {
            config,
            settings,
            monitor,
        } => demo(config.as_deref(), &settings, monitor).await,
    }
}

async fn convert(prices: &[String], wage: Option<f64>, hours: Option<f64>, settings: &str) -> Result<()> {
    let stored = if wage.is_some() && hours.is_some() {
        Settings::default()
    } else {
        let store = JsonFileSettingsStore::open(settings).await?;
        SettingsBridge::new(Arc::new(store)).load().await?
    };
    let settings = Settings::new(wage.or(stored.hourly_wage), hours.unwrap_or(stored.daily_hours));

    if !settings.is_active() {
        println!("⚠️  No hourly wage configured; run `wage-clock configure` or pass --wage");
        return Ok(());
    }

    for text in prices {
        let label = parse_price(text)
            .and_then(|price| format_duration(price, settings.hourly_wage, settings.daily_hours));
        match label {
            Some(label) => println!("{} → {}", text, label),
            None => println!("{} → (not a price)", text),
        }
    }
    Ok(())
}

/// Converts a small product page, then scrolls in more results and changes
/// the wage while the engine is running.
async fn demo(config_path: Option<&str>, settings_path: &str, monitor: bool) -> Result<()> {
    let site = match config_path {
        Some(path) => SiteConfig::from_file(path)?,
        None => SiteConfig::default(),
    };
    site.validate()?;

    if monitor {
        tracing::info!("🔍 Pass monitoring enabled");
    }

    // 用設定檔的薪資，但不改動它
    let file_store = JsonFileSettingsStore::open(settings_path).await?;
    let form = load_or_seed(&file_store).await?;
    let store = Arc::new(MemorySettingsStore::new());
    save_salary(store.as_ref(), &form).await?;

    let mut page = MemoryDom::new();
    let body = page.body();
    let feature = page.create_element("div", &[]);
    page.set_id(feature, "corePrice_feature_div");
    page.append_child(body, feature);

    let mut shown = vec![
        page.append_price_widget(feature, &site.selectors, "$", "24", "00"),
        page.append_bare_price(feature, &site.selectors.offscreen, "$1,299.99"),
    ];
    let results = page.create_element("div", &[]);
    page.append_child(body, results);
    shown.push(page.append_price_widget(results, &site.selectors, "₹", "1,999", "00"));

    let dom = Arc::new(Mutex::new(page));
    let frame = site.frame_interval();
    let handle =
        TimeEngine::new_with_monitoring(Arc::clone(&store), Arc::clone(&dom), site.clone(), monitor)
            .start()
            .await;
    print_page(&dom, &shown, &site, "🚀 Page loaded");

    {
        let mut page = lock(&dom);
        shown.push(page.append_price_widget(results, &site.selectors, "£", "5", "49"));
        shown.push(page.append_price_widget(results, &site.selectors, "$", "48,000", "00"));
    }
    settle(frame).await;
    print_page(&dom, &shown, &site, "📜 More results scrolled in");

    let raise = SalaryForm {
        salary_amount: form.salary_amount * 2.0,
        ..form
    };
    save_salary(store.as_ref(), &raise).await?;
    settle(frame).await;
    print_page(&dom, &shown, &site, "📈 Salary doubled");

    store
        .set(
            StorageArea::Sync,
            [(STORAGE_KEY_HOURLY.to_string(), serde_json::Value::Null)].into(),
        )
        .await?;
    settle(frame).await;
    print_page(&dom, &shown, &site, "🧹 Wage cleared");

    let stats = handle.shutdown().await?;
    println!("✅ Demo finished after {} passes", stats.passes());
    Ok(())
}

async fn settle(frame: Duration) {
    tokio::time::sleep(frame * 6).await;
}

fn lock(dom: &Mutex<MemoryDom>) -> std::sync::MutexGuard<'_, MemoryDom> {
    dom.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn print_page(dom: &Mutex<MemoryDom>, shown: &[NodeId], site: &SiteConfig, title: &str) {
    let page = lock(dom);
    println!("{}", title);
    for node in shown {
        let text = if page.has_class(*node, &site.selectors.price_container) {
            page.visible_text(*node, &[site.selectors.offscreen.as_str()])
        } else {
            page.text_content(*node)
        };
        println!("   {}", text);
    }
}
