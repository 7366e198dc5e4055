pub mod config;
pub mod error;
pub mod finder;
pub mod launch;
pub mod layout;
pub mod session;
pub mod slug;

pub use config::{Config, TmuxConfig};
pub use error::{DiscoveryError, LaunchError};
pub use finder::{ProjectFinder, SearchTool};
pub use launch::launch;
pub use layout::{Layout, LayoutStore};
pub use session::{SessionGateway, TmuxGateway};
pub use slug::{project_name, slugify};
