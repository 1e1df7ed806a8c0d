//! autoevs - configuration resolution with transparent credential encryption.
//!
//! Collectors call [`ConfigResolver::resolve`](core::resolver::ConfigResolver::resolve)
//! with an environment, a component and optionally an instance, and get back
//! a merged mapping with every sensitive value already decrypted.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── seed          # Seed generation and status
//! │   ├── encrypt       # In-place file encryption, single values
//! │   ├── show          # Resolved configuration (masked by default)
//! │   ├── instances     # Instance listing
//! │   ├── check         # Resolve everything in an environment
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── store/        # Seed backends
//!     │   ├── mod       # SeedStore trait, Seed
//!     │   ├── env       # AUTOEVS_CRYPTO_SEED_<ENV>
//!     │   ├── fs        # <seed_dir>/<env>.seed
//!     │   └── backend   # Environment first, then files
//!     ├── cipher/       # Encryption
//!     │   ├── mod       # Cipher trait
//!     │   ├── aes       # HKDF + AES-256-GCM CryptoContext
//!     │   └── envelope  # ENCRYPTED: envelope codec
//!     ├── detect        # Sensitive field rules
//!     ├── document      # common / instances documents
//!     ├── merge         # common under instance
//!     ├── resolver      # Resolution, decryption, cache
//!     ├── yaml_edit     # Line-level value locator
//!     ├── tool          # In-place encryption of files
//!     └── settings      # autoevs.toml
//! ```
//!
//! # Example
//!
//! ```no_run
//! use autoevs::core::resolver::ConfigResolver;
//! use autoevs::core::settings::Settings;
//!
//! # fn main() -> autoevs::error::Result<()> {
//! let settings = Settings::load(None)?;
//! let mut resolver = ConfigResolver::from_settings(&settings)?;
//! let hive = resolver.resolve("prod", "hive", Some("primary"))?;
//! let password = hive.get_str("password");
//! # let _ = password;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
