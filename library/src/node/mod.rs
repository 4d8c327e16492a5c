pub mod automatic;
pub mod pin;
pub mod result;

pub use automatic::{AutomaticNode, AutomaticNodeState};
pub use pin::{Connection, InputPin, OutputPin, PinKind, PinRef, ValueSource, preferred_output_title};
pub use result::{NodeExecutionResult, NodeMessage, NodeMessageType};
