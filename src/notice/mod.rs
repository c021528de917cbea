//! `{{copied}}` notice model.
//!
//! A notice ([`CopiedTemplate`]) owns an ordered list of attribution records
//! ([`Row`]). Rows are decoded from and encoded to the notice's template
//! parameters by [`codec`]; changes are announced through [`events`].

pub mod codec;
pub mod diff;
pub mod events;
pub mod row;
pub mod template;

pub use diff::{DiffLink, parse_diff_link};
pub use events::{DocumentEvent, ListenerId, NoticeEvent, Notifier};
pub use row::{AttributionSummary, FieldWarning, Row, RowField, RowFields, RowId, RowIdSequence};
pub use template::{CopiedTemplate, notice_identifier};
