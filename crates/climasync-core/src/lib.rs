// climasync-core: idempotent upsert engine and the bulletin workflows built on it.

pub mod campaign;
pub mod error;
pub mod naming;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod resolve;
pub mod resource;
pub mod settings;
pub mod source;
pub mod sync;
pub mod tally;
pub mod templates;
pub mod trigger;
pub mod weather;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use normalize::{FieldKind, NormalizedValue, Normalizer};
pub use reconcile::{Desired, Diff, FieldMap, Outcome, Reconciler, Resource, Upserted};
pub use record::{
    Company, Contact, EmailTemplate, RecordId, RemoteRecord, Segment, SmsTemplate, TypedRecord,
};
pub use resource::{ContactKey, MauticResource, ResourceKind};
pub use settings::{
    BulletinConfig, ConsoleConfig, MauticConfig, Settings, SourceConfig, TlsVerification,
    WeatherConfig,
};
pub use source::{FieldMapping, SourceUser, load_users};
pub use sync::{
    BulletinReport, CampaignReport, Channel, SegmentReport, SendReport, Synchronizer,
};
pub use tally::Tally;
pub use trigger::{ConsoleRunner, RetryPolicy, TriggerReport, trigger_campaigns};
pub use weather::{Reading, WeatherService};
