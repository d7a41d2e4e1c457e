use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flirtwin_appcore::service::{
    ActionError, AppService, DEFAULT_PROFILE_GOALS, DEFAULT_USER_IDENTIFIER,
    default_budget_label, default_date_vibe_label,
};
use flirtwin_core::types::{
    Budget, ChatReview, CoachReplySet, DateIdea, DateVibe, ProfileAnalysis, Vibe,
};
use flirtwin_engine::gate::UnlockOutcome;
use flirtwin_runtime::files::{load_image, load_images};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flirtwin")]
#[command(about = "Flirty messages, reply coaching, chat and profile reviews, and date ideas")]
struct Cli {
    /// Config file (generator settings and saved message preferences)
    #[arg(long, default_value = "flirtwin.json")]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate five flirty messages. Unset options use the saved preferences.
    Messages {
        #[arg(long)]
        recipient: Option<String>,
        /// One of: playful, romantic, bold, witty, mysterious, sweet, poetic, sexual
        #[arg(long)]
        vibe: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// List inspiration categories, or load more texts for one of them.
    Inspire {
        #[arg(long)]
        category: Option<String>,
    },
    /// Three suggested replies to a message you received (premium).
    Coach {
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "")]
        history: String,
        #[arg(long)]
        watch_ad: bool,
    },
    /// Review a chat screenshot (premium).
    Review {
        #[arg(long)]
        screenshot: Option<PathBuf>,
        /// Which messages are yours
        #[arg(long, default_value = DEFAULT_USER_IDENTIFIER)]
        me: String,
        #[arg(long)]
        watch_ad: bool,
    },
    /// Analyze up to six profile photos and a bio (premium).
    Profile {
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long, default_value = DEFAULT_PROFILE_GOALS)]
        goals: String,
        #[arg(long)]
        watch_ad: bool,
    },
    /// Three date ideas.
    Dates {
        /// Casual, Romantic, Adventurous, Unique or At-home
        #[arg(long, default_value = default_date_vibe_label())]
        vibe: String,
        /// Free, Cheap, Moderate or Splurge
        #[arg(long, default_value = default_budget_label())]
        budget: String,
        #[arg(long, default_value = "")]
        interests: String,
    },
    /// Show or change the saved message preferences.
    Prefs {
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long)]
        vibe: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_list(items: &[String]) {
    for (i, m) in items.iter().enumerate() {
        println!("{}. {m}", i + 1);
    }
}

fn print_coach(set: &CoachReplySet) {
    for (i, r) in set.replies.iter().enumerate() {
        println!("{}. {}", i + 1, r.reply);
        println!("   why: {}", r.explanation);
    }
}

fn print_review(review: &ChatReview) {
    println!("{}\n", review.overall_feedback);
    for c in &review.critiques {
        println!("> {}", c.original_message);
        println!("  {}", c.critique);
        println!("  try: {}\n", c.suggestion);
    }
}

fn print_profile(analysis: &ProfileAnalysis) {
    println!("{}\n", analysis.overall_feedback);
    for (i, p) in analysis.photo_analysis.iter().enumerate() {
        println!("Photo {} ({})", i + 1, p.photo_description);
        println!("  {}", p.critique);
        println!("  try: {}", p.suggestion);
    }
    println!("\nBio");
    println!("  {}", analysis.bio_analysis.critique);
    println!("  try: {}", analysis.bio_analysis.suggestion);
}

fn print_dates(ideas: &[DateIdea]) {
    for idea in ideas {
        println!("{} {}", idea.emoji, idea.title);
        println!("  {}", idea.description);
    }
}

async fn unlock_if_asked(svc: &AppService, watch_ad: bool) {
    if !watch_ad {
        return;
    }
    if svc.watch_ad() != UnlockOutcome::AlreadyUnlocked {
        eprintln!("Watching a short ad...");
        svc.gate().wait_unlocked().await;
        eprintln!("Unlocked!");
    }
}

async fn run(cli: Cli, svc: &AppService) -> anyhow::Result<Result<(), ActionError>> {
    let json = cli.json;
    match cli.command {
        Command::Messages {
            recipient,
            vibe,
            context,
        } => {
            if recipient.is_some() || vibe.is_some() || context.is_some() {
                let vibe = vibe.as_deref().map(str::parse::<Vibe>).transpose()?;
                svc.update_preferences(|p| {
                    if let Some(r) = recipient {
                        p.recipient = r;
                    }
                    if let Some(v) = vibe {
                        p.vibe = v;
                    }
                    if let Some(c) = context {
                        p.context = c;
                    }
                })?;
            }
            match svc.generate_messages_from_preferences().await {
                Ok(out) => print(json, &out, |m| print_list(m))?,
                Err(e) => return Ok(Err(e)),
            }
        }
        Command::Inspire { category: None } => {
            let categories = svc.inspiration_categories();
            print(json, &categories, |cs| {
                for c in cs {
                    println!("{}", c.title);
                    for t in &c.texts {
                        println!("  - {t}");
                    }
                }
            })?;
        }
        Command::Inspire {
            category: Some(title),
        } => match svc.load_more_inspiration(&title).await {
            Ok(c) => print(json, &c, |c| print_list(&c.texts))?,
            Err(e) => return Ok(Err(e)),
        },
        Command::Coach {
            message,
            history,
            watch_ad,
        } => {
            unlock_if_asked(svc, watch_ad).await;
            match svc.coach_replies(&message, &history).await {
                Ok(set) => print(json, &set, print_coach)?,
                Err(e) => return Ok(Err(e)),
            }
        }
        Command::Review {
            screenshot,
            me,
            watch_ad,
        } => {
            let image = match screenshot {
                Some(p) => Some(load_image(&p).await?),
                None => None,
            };
            unlock_if_asked(svc, watch_ad).await;
            match svc
                .review_chat(image.as_ref().map(|i| &i.attachment), &me)
                .await
            {
                Ok(review) => print(json, &review, print_review)?,
                Err(e) => return Ok(Err(e)),
            }
        }
        Command::Profile {
            photos,
            bio,
            goals,
            watch_ad,
        } => {
            let images = load_images(&photos).await?;
            let attachments: Vec<_> = images.into_iter().map(|i| i.attachment).collect();
            unlock_if_asked(svc, watch_ad).await;
            match svc.analyze_profile(&attachments, &bio, &goals).await {
                Ok(analysis) => print(json, &analysis, print_profile)?,
                Err(e) => return Ok(Err(e)),
            }
        }
        Command::Dates {
            vibe,
            budget,
            interests,
        } => match svc.date_ideas(&vibe, &budget, &interests).await {
            Ok(ideas) => print(json, &ideas, |i| print_dates(i))?,
            Err(e) => return Ok(Err(e)),
        },
        Command::Prefs {
            recipient,
            vibe,
            context,
        } => {
            let vibe = vibe.as_deref().map(str::parse::<Vibe>).transpose()?;
            let prefs = if recipient.is_some() || vibe.is_some() || context.is_some() {
                svc.update_preferences(|p| {
                    if let Some(r) = recipient {
                        p.recipient = r;
                    }
                    if let Some(v) = vibe {
                        p.vibe = v;
                    }
                    if let Some(c) = context {
                        p.context = c;
                    }
                })?
            } else {
                svc.preferences()
            };
            print(json, &prefs, |p| {
                println!("recipient: {}", p.recipient);
                println!("vibe:      {} {}", p.vibe, p.vibe.emoji());
                println!("context:   {}", p.context);
                let vibes: Vec<_> = Vibe::ALL.iter().map(|v| v.as_str()).collect();
                let dates: Vec<_> = DateVibe::ALL.iter().map(|v| v.label()).collect();
                let budgets: Vec<_> = Budget::ALL.iter().map(|b| b.label()).collect();
                println!("\nvibes:      {}", vibes.join(", "));
                println!("date vibes: {}", dates.join(", "));
                println!("budgets:    {}", budgets.join(", "));
            })?;
        }
    }
    Ok(Ok(()))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let svc = match AppService::open(cli.config.clone()) {
        Ok(svc) => svc,
        Err(e) => {
            log::error!("startup failed: {e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &svc).await {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e @ ActionError::Locked { .. })) => {
            eprintln!("{}", e.user_message());
            eprintln!("Re-run with --watch-ad to unlock premium features.");
            ExitCode::from(2)
        }
        Ok(Err(e)) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
