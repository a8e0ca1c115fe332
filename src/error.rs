use thiserror::Error;

/// Failures that concern a single record (label, row or lookup).
///
/// A malformed label aborts processing loudly: it means the source started
/// publishing a label shape nobody has seen before. Everything else is
/// reported for the offending record and the batch carries on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("bad label {label:?}: suffix {suffix:?} is neither a state nor a country code")]
    MalformedLabel { label: String, suffix: String },

    #[error("bad label {label:?}: age restriction U{age} out of range")]
    AgeOutOfRange { label: String, age: u32 },

    #[error("match {id}: cannot read score {score:?}")]
    BadScore { id: String, score: String },

    #[error("match {id}: cannot read date {date:?}")]
    BadDate { id: String, date: String },

    #[error("team {label:?} is not in the registry")]
    UnknownTeam { label: String },

    #[error("no translation for country {country:?}")]
    MissingTranslation { country: String },
}
