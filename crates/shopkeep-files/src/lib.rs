//! Token-addressed file storage for Shopkeep.
//!
//! Files are addressed by opaque `/`-separated [`FileToken`]s and streamed
//! through tokio readers and writers. Two backends are provided: one on the
//! local filesystem and one in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopkeep_files::prelude::*;
//!
//! let files = LocalFiles::new("./data/files");
//! let token = file_token!("products", product_id, "image")?;
//!
//! // Store a file
//! files.write(&token, &bytes).await?;
//!
//! // Stream it back
//! let mut reader = files.open(&token).await?;
//!
//! // Drop everything stored for products
//! files.delete_all(&file_token!("products")?).await?;
//! ```

mod error;
mod local;
mod memory;
mod storage;
mod token;

pub use error::FileError;
pub use local::LocalFiles;
pub use memory::MemoryFiles;
pub use storage::{FileReader, FileStorage, FileWriter, SharedFiles};
pub use token::FileToken;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        file_token, FileError, FileStorage, FileToken, LocalFiles, MemoryFiles, SharedFiles,
    };
}
