use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use keyadapt::app::{LessonOptions, Trainer};
use keyadapt::config::Config;
use keyadapt::generator::blend::MixOptions;
use keyadapt::keyboard::layout::{LayoutFamily, REFERENCE_LAYOUT_ID, Region};
use keyadapt::store::json_store::JsonPreferenceStore;

#[derive(Parser)]
#[command(name = "keyadapt", version, about = "Keyboard layout detection and layout-aware typing lessons")]
struct Cli {
    #[arg(long, help = "Directory of <language>.json word lists to use instead of the bundled ones")]
    word_dir: Option<std::path::PathBuf>,

    #[arg(short, long, help = "Primary lesson language (en, de, es, fr)")]
    language: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Guess the layout from the home row typed left to right
    Detect {
        sample: String,
        #[arg(long, help = "Remember the detected layout when it is unambiguous")]
        save: bool,
    },
    /// Rewrite reference-layout text for another layout
    Transform {
        layout: String,
        text: Vec<String>,
    },
    /// Print a generated lesson as JSON
    Lesson {
        #[arg(short = 'L', long, help = "Layout id (defaults to the saved layout)")]
        layout: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        stage: u32,
        #[arg(long, help = "Secondary language to blend in")]
        mix: Option<String>,
        #[arg(long, help = "Secondary language share in percent")]
        ratio: Option<u8>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, help = "Print every stage instead of one")]
        all: bool,
    },
    /// List the layout catalog
    Layouts {
        #[arg(long)]
        family: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("config unreadable, using defaults: {e:#}");
        Config::default()
    });
    if let Some(dir) = cli.word_dir {
        config.word_dir = Some(dir);
    }
    if let Some(language) = cli.language {
        config.language = language;
        config.normalize();
    }

    let mut trainer = Trainer::from_config(config);
    match JsonPreferenceStore::new() {
        Ok(store) => trainer = trainer.with_store(Box::new(store)),
        Err(e) => log::warn!("preferences unavailable: {e:#}"),
    }

    match cli.command {
        Command::Detect { sample, save } => {
            let result = trainer.detect_layout(&sample);
            if save && let Some(id) = &result.layout {
                trainer.confirm_layout(id)?;
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Transform { layout, text } => {
            println!("{}", trainer.transform_text(&text.join(" "), &layout)?);
        }
        Command::Lesson {
            layout,
            stage,
            mix,
            ratio,
            seed,
            all,
        } => {
            let layout_id = match layout {
                Some(id) => id,
                None => trainer
                    .preferred_layout()
                    .map(|l| l.id.to_string())
                    .unwrap_or_else(|| REFERENCE_LAYOUT_ID.to_string()),
            };
            let target = trainer.registry().require(&layout_id)?;
            let mut options = trainer.default_options(target.family);
            if let Some(language) = mix {
                let ratio = ratio.unwrap_or(trainer.config().mix_ratio_percent);
                options = options.with_mix(Some(MixOptions::new(&language, ratio)));
            }
            if let Some(seed) = seed {
                options = options.with_seed(seed);
            }

            if all {
                let lessons = trainer.generate_all_lessons(&options)?;
                println!("{}", serde_json::to_string_pretty(lessons.as_ref())?);
            } else {
                let lesson = trainer.lesson_for_layout(&layout_id, stage, &options)?;
                println!("{}", serde_json::to_string_pretty(&lesson)?);
            }
        }
        Command::Layouts { family, region } => {
            let family = family
                .map(|f| LayoutFamily::from_key(&f).with_context(|| format!("unknown family {f:?}")))
                .transpose()?;
            let region = region
                .map(|r| Region::from_key(&r).with_context(|| format!("unknown region {r:?}")))
                .transpose()?;
            let layouts: Vec<_> = trainer
                .registry()
                .all()
                .iter()
                .filter(|l| family.is_none_or(|f| l.family == f))
                .filter(|l| region.is_none_or(|r| l.region == r))
                .collect();
            if layouts.is_empty() {
                bail!("no layouts match");
            }
            for layout in layouts {
                println!(
                    "{:<12} {:<8} {:<16} {}  {}",
                    layout.id,
                    layout.family.to_key(),
                    layout.region.to_key(),
                    layout.home_row_signature(),
                    layout.name
                );
            }
        }
    }

    Ok(())
}
