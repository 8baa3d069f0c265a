//! # Vista Core
//!
//! Business logic behind the analysis page:
//!
//! ```text
//! vista-core/src/
//! ├── builder.rs    # image + context -> chat completion request
//! ├── renderer/     # stream of chunks -> ordered render frames
//! ├── session/      # per-visit state, evaluation, in-memory store
//! └── analysis.rs   # builder + renderer for one button press
//! ```

#![cfg_attr(test, allow(clippy::panic, clippy::print_stdout))]

pub mod analysis;
pub mod builder;
pub mod renderer;
pub mod session;

pub use analysis::{run_analysis, AnalysisInput};
pub use builder::{build_request, BuildError, PromptContext};
pub use renderer::{render_stream, FragmentSource, Frame, Outcome, RenderSink, RenderState};
pub use session::{FormUpdate, SessionError, SessionState, SessionStore, UploadedImage, Warning};
