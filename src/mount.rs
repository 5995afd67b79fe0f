use web_sys::{Document, Element};


/// Looks up the node an application renders into.
pub trait MountResolver {
    type Node;

    fn resolve(&self, id: &str) -> Option<Self::Node>;
}

impl MountResolver for Document {
    type Node = Element;

    #[inline]
    fn resolve(&self, id: &str) -> Option<Self::Node> {
        Document::get_element_by_id(self, id)
    }
}
