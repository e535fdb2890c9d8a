pub mod auth;
pub mod checklist_service;
pub mod completion;
pub mod drive_service;
pub mod google_auth;
pub mod intake_service;
pub mod ledger_service;
