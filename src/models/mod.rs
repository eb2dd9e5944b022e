//! Seating domain models.
//!
//! Provides the core data types for representing seating problems and
//! their solutions. Participants and trait domains are built fresh per run
//! from the caller's table; the assignment is produced once and handed back
//! immutable.
//!
//! # Domain Mappings
//!
//! | u-seating | World café | Classroom | Conference |
//! |-----------|-----------|-----------|------------|
//! | Participant | Attendee | Student | Delegate |
//! | Trait | Expertise / region | Major | Affiliation |
//! | Table | Café table | Study group | Breakout |
//! | Round | Conversation round | Project phase | Session |

mod assignment;
mod capacity;
mod catalog;
mod participant;
mod schedule;

pub use assignment::Assignment;
pub use capacity::CapacityPlan;
pub use catalog::{TraitCatalog, TraitDomain};
pub use participant::{normalize_value, Participant, Population, Record, UNKNOWN_VALUE};
pub use schedule::{diversity_score, ParticipantRow, RosterEntry, ScheduleScore, SeatingSchedule};
