//! Subcommand arguments and their execution against the engine.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Subcommand};
use palate_core::{
    ApiEnvelope, Category, GourmetFriendPin, NoteId, NoteStore, PinStore, SimilarityResult,
    TasteSimilarity, UserId,
};
use palate_data::{SqliteNoteStore, SqlitePinStore};
use palate_scorer::{SimilarityCache, TasteEngine};
use palate_social::{FeedCandidate, FriendRegistry, SocialRanker, discover_similar_users};
use serde::Serialize;
use serde_json::Value;

use crate::CliError;
use crate::config::EngineConfig;

const DEFAULT_FEED_LIMIT: usize = 20;
const DEFAULT_DISCOVER_LIMIT: usize = 10;

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Import tasting notes from a JSON array.
    Import(ImportArgs),
    /// Compare two users' palates.
    Similarity(SimilarityArgs),
    /// Show the similarity section of a user's profile.
    Profile(PairArgs),
    /// Preview whether a user can be pinned.
    CanPin(PairArgs),
    /// Pin a user as a Gourmet Friend.
    Pin(PinArgs),
    /// Remove a pin or one of its categories.
    Unpin(UnpinArgs),
    /// List a user's Gourmet Friends.
    Friends(ViewerArgs),
    /// Rank public notes for a viewer.
    Feed(FeedArgs),
    /// Suggest users with similar taste.
    Discover(DiscoverArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ImportArgs {
    /// JSON file containing an array of notes.
    #[arg(value_name = "path")]
    pub(crate) path: Utf8PathBuf,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct PairArgs {
    /// User looking at the other user.
    pub(crate) viewer: String,
    /// User being looked at.
    pub(crate) target: String,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SimilarityArgs {
    /// First user.
    pub(crate) user_a: String,
    /// Second user.
    pub(crate) user_b: String,
    /// Restrict the comparison to one category.
    #[arg(long, value_name = "category")]
    pub(crate) category: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct PinArgs {
    #[command(flatten)]
    pub(crate) pair: PairArgs,
    /// Category to pin in; repeat for several.
    #[arg(long = "category", value_name = "category", required = true)]
    pub(crate) categories: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct UnpinArgs {
    #[command(flatten)]
    pub(crate) pair: PairArgs,
    /// Remove only this category.
    #[arg(long, value_name = "category")]
    pub(crate) category: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ViewerArgs {
    /// User whose view is built.
    pub(crate) viewer: String,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct FeedArgs {
    /// User the feed is built for.
    pub(crate) viewer: String,
    /// Group notes by tier instead of paging.
    #[arg(long)]
    pub(crate) bucketed: bool,
    /// Note id the previous page ended with.
    #[arg(long, value_name = "note-id")]
    pub(crate) cursor: Option<String>,
    /// Page size.
    #[arg(long, value_name = "count", default_value_t = DEFAULT_FEED_LIMIT)]
    pub(crate) limit: usize,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct DiscoverArgs {
    /// User suggestions are made for.
    pub(crate) viewer: String,
    /// Maximum number of suggestions.
    #[arg(long, value_name = "count", default_value_t = DEFAULT_DISCOVER_LIMIT)]
    pub(crate) limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportOutcome {
    imported: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnpinOutcome {
    removed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryUnpinOutcome {
    remaining: Option<GourmetFriendPin>,
}

/// Stores and services opened for one invocation.
pub(crate) struct Services {
    notes: Arc<SqliteNoteStore>,
    engine: TasteEngine,
    registry: FriendRegistry,
    ranker: SocialRanker,
}

impl Services {
    /// Open both stores on the configured database and wire the services.
    pub(crate) fn open(config: &EngineConfig) -> Result<Self, CliError> {
        let cache = Arc::new(SimilarityCache::new());
        let notes = Arc::new(
            SqliteNoteStore::open(config.database.clone())?.with_observer(cache.clone()),
        );
        let pins: Arc<dyn PinStore> = Arc::new(SqlitePinStore::open(config.database.clone())?);
        let note_store: Arc<dyn NoteStore> = notes.clone();
        let engine = TasteEngine::new(note_store, config.policy).with_cache(cache);
        Ok(Self {
            notes,
            registry: FriendRegistry::new(engine.clone(), Arc::clone(&pins)),
            ranker: SocialRanker::new(engine.clone(), pins),
            engine,
        })
    }
}

fn payload<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(CliError::SerialiseOutput)
}

fn parse_categories(raw: &[String]) -> Result<Vec<Category>, CliError> {
    raw.iter()
        .map(|name| name.parse::<Category>().map_err(CliError::from))
        .collect()
}

fn summarise(results: &[SimilarityResult], min_overlap: u32) -> Vec<TasteSimilarity> {
    results
        .iter()
        .map(|result| TasteSimilarity::from_result(result, min_overlap))
        .collect()
}

/// Run one subcommand and return its JSON payload.
pub(crate) async fn execute(command: Command, services: &Services) -> Result<Value, CliError> {
    let min_overlap = services.engine.policy().pin_min_overlap;
    match command {
        Command::Import(args) => {
            let imported = services.notes.import_notes_file(args.path).await?;
            payload(&ImportOutcome { imported })
        }
        Command::Similarity(args) => {
            let (user_a, user_b) = (UserId::from(args.user_a), UserId::from(args.user_b));
            let results = match args.category {
                Some(name) => vec![services.engine.compare_named(&user_a, &user_b, &name).await?],
                None => services
                    .engine
                    .compare_all(&user_a, &user_b)
                    .await
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()?,
            };
            payload(&summarise(&results, min_overlap))
        }
        Command::Profile(args) => {
            let view = services
                .registry
                .profile_view(&args.viewer.into(), &args.target.into())
                .await?;
            payload(&view)
        }
        Command::CanPin(args) => {
            let preview = services
                .registry
                .can_pin(&args.viewer.into(), &args.target.into())
                .await?;
            payload(&preview)
        }
        Command::Pin(args) => {
            let categories = parse_categories(&args.categories)?;
            let pin = services
                .registry
                .pin(&args.pair.viewer.into(), &args.pair.target.into(), &categories)
                .await?;
            payload(&pin)
        }
        Command::Unpin(args) => {
            let (viewer, target) = (UserId::from(args.pair.viewer), UserId::from(args.pair.target));
            match args.category {
                Some(name) => {
                    let category: Category = name.parse()?;
                    let remaining = services
                        .registry
                        .unpin_category(&viewer, &target, category)
                        .await?;
                    payload(&CategoryUnpinOutcome { remaining })
                }
                None => {
                    let removed = services.registry.unpin(&viewer, &target).await?;
                    payload(&UnpinOutcome { removed })
                }
            }
        }
        Command::Friends(args) => {
            let friends = services.registry.list_friends(&args.viewer.into()).await?;
            payload(&friends)
        }
        Command::Feed(args) => {
            let viewer = UserId::from(args.viewer);
            let notes = services.notes.feed_notes(&viewer).await?;
            let ranked = services
                .ranker
                .rank(&viewer, notes.iter().map(FeedCandidate::from))
                .await;
            if args.bucketed {
                payload(&ranked.into_buckets())
            } else {
                let cursor = args.cursor.map(NoteId::from);
                payload(&ranked.paginate(cursor.as_ref(), args.limit))
            }
        }
        Command::Discover(args) => {
            let suggestions =
                discover_similar_users(&services.engine, &args.viewer.into(), args.limit).await?;
            payload(&suggestions)
        }
    }
}

/// Write `payload` wrapped in an [`ApiEnvelope`] as pretty JSON.
pub(crate) fn write_envelope(writer: &mut dyn Write, payload: Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&ApiEnvelope::ok(payload))
        .map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(rendered.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}
