//! Hy: Structured Values as Browsable File Trees
//!
//! A bidirectional codec that projects a value of a record, map, or sequence type
//! onto a tree of file targets (path → payload) and reconstructs the value from
//! such a tree. Per-field directives decide which parts of a value get their own
//! file or directory and which are stored inline with their siblings.
//!
//! ```
//! use hy::{Codec, Shape, Storable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Doc {
//!     name: String,
//!     items: Vec<String>,
//! }
//!
//! impl Storable for Doc {
//!     fn shape() -> Shape {
//!         Shape::record()
//!             .field::<String>("name", "")
//!             .field::<Vec<String>>("items", "items/")
//!             .into()
//!     }
//! }
//!
//! let codec = Codec::new();
//! let doc = Doc { name: "A".into(), items: vec!["x".into(), "y".into()] };
//! let targets = codec.write(&doc).unwrap();
//! assert_eq!(targets.paths().collect::<Vec<_>>(), vec!["", "items/0", "items/1"]);
//!
//! let index = codec.to_index(&targets).unwrap();
//! assert_eq!(codec.read::<Doc>(&index, "").unwrap(), doc);
//! ```

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod field_info;
pub mod io;
pub mod logging;
pub mod node;
pub mod shape;
pub mod tag;
pub mod target;
pub mod value;

pub use codec::{Codec, CodecBuilder};
pub use config::{CodecConfig, ConfigLoader, FormatKind};
pub use error::{CodecError, ErrorKind, Result, ResultExt, TagError};
pub use io::{FileMarshaler, FileTreeScanner, FileWriter, Format, JsonFormat, TreeScanner};
pub use shape::{Shape, Storable, TypeRef};
pub use target::{FileTarget, FileTargets, ReadIndex};
