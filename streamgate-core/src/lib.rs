pub mod access;
pub mod content;
pub mod error;
pub mod event;
pub mod history;
pub mod live;
pub mod purchase;
pub mod repository;
pub mod ticket;
pub mod user;

pub use access::{AccessChecker, AccessDecision};
pub use error::TicketingError;
pub use event::{Event, EventDraft, EventStatus};
pub use purchase::{PurchaseCoordinator, PurchaseRequest};
pub use ticket::{Ticket, TicketStatus};
pub use user::{Role, UserProfile};
