//! # Views
//!
//! Terminal view models. Each holds its own form or cart state, runs
//! workflows against [`AppState`](crate::state::AppState), and renders to a
//! `String` that the terminal loop prints.
//!
//! | View        | Shown when                         |
//! |-------------|------------------------------------|
//! | `LoginView` | guard says `RedirectToLogin`       |
//! | `SaleView`  | guard says `Allow`                 |

pub mod login;
pub mod sale;

pub use login::{LoginOutcome, LoginView};
pub use sale::{Banner, CheckoutReport, SaleView, StepOutcome};
