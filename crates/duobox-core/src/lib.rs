//! duobox core library: UI-agnostic logic for browsing a remote archive.
//!
//! `duobox-core` owns everything between the key press and the pixels: it
//! lists remote folders through a [`RemoteDirectoryClient`], caches the
//! (possibly partial) listings, and drives two independent panels over that
//! shared cache. The terminal frontend (`duobox-tui`) only translates keys
//! into [`Intent`]s and draws the [`render_model::Snapshot`].
//!
//! # Modules
//!
//! - [`archive`]: Data model: [`RemotePath`], [`DirectoryEntry`], [`Listing`] pages.
//! - [`remote`]: The client trait plus the Dropbox and in-memory implementations.
//! - [`cache`]: [`ListingCache`]: LRU + TTL with in-flight fetch deduplication.
//! - [`nav`]: Panels, history, view policy, and the [`NavigationController`].
//! - [`render_model`]: Display-ready projection of both panels.
//! - [`config`]: User-facing configuration (TOML-based settings, keymaps, themes).
//! - [`event`]: Intents from the UI and fetch completions from spawned tasks.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod action;
pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod nav;
pub mod remote;
pub mod render_model;

pub use archive::{Cursor, DirectoryEntry, EntryKind, Listing, Page, RemotePath};
pub use cache::ListingCache;
pub use error::{CoreError, CoreResult, TransportError};
pub use event::{FetchEvent, Intent};
pub use nav::filter::{SortField, ViewPolicy};
pub use nav::history::History;
pub use nav::panel::{PanelState, PanelStatus};
pub use nav::{NavigationController, NavigationOptions, Side};
pub use remote::{DropboxClient, DropboxConfig, MemoryArchive, RemoteDirectoryClient};
pub use render_model::{snapshot, EntryView, PanelView, Snapshot};

pub use action::{Action, ActionCategory, ActionDescriptor, ActionRegistry};
pub use config::keymap::Keymap;
pub use config::settings::Config;
pub use config::theme::{parse_color, Theme};
