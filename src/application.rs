use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ports::Ports;


/// Everything an application receives when it starts.
///
/// `flags` is `None` when nothing was stored, which is different from any
/// stored value (including an empty one).
#[derive(Debug)]
pub struct Init<F, N> {
    pub flags: Option<F>,
    pub node: N,
}


/// An application that can be mounted by [`Bootstrap`](crate::Bootstrap).
pub trait Application {
    type Flags: DeserializeOwned;
    type State: Serialize + 'static;
    type Node;

    /// Creates the application and renders it into `init.node`.
    fn init(init: Init<Self::Flags, Self::Node>) -> Self;

    fn ports(&self) -> &Ports<Self::State>;
}
