mod content;
mod identity;
mod ids;
mod quiz;
mod result;
mod settings;

pub use content::{ContentError, ContentItem, ContentItemDraft, ContentItemKind, DayContent};
pub use identity::{AdminIdentity, IdentityError, UserIdentity};
pub use ids::DayNumber;
pub use quiz::{Question, QuestionError, QuizKind, derive_bank};
pub use result::{ScoreRecord, sort_standings};
pub use settings::{EventSettings, EventSettingsDraft, EventSettingsError};
