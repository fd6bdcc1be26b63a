//! Line-delimited JSON command protocol.
//!
//! The host writes one JSON object per line on stdin and reads one envelope
//! per line on stdout:
//!
//! ```text
//! > {"cmd":"geocode","query":"Stockholm Central"}
//! < {"status":"ok","data":[{"type":"STOP","name":"Stockholm Central",...}]}
//! > {"cmd":"get_tile","z":0,"x":0,"y":0}
//! < {"status":"ok","data":{"found":false}}
//! > {"cmd":"unknown_thing"}
//! < {"status":"error","message":"Unknown command: unknown_thing"}
//! ```

mod errors;
mod request;
mod response;
mod router;
mod session;

pub use errors::DispatchError;
pub use request::CommandRequest;
pub use response::ResponseWriter;
pub use router::{CommandRouter, command_names};
pub use session::{Session, SessionSummary};
