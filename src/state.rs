use serde::{Serialize, Deserialize};


/// The persisted todo list, stored as `{"todos":[{"id":1,"text":"milk","done":false}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub todos: Vec<TodoItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u32,
    pub text: String,
    pub done: bool,
}

impl State {
    /// The id after the largest one in use, starting at 1. Wraps back to 1
    /// after `u32::MAX`, so the caller still has to skip ids in use.
    pub fn next_id(&self) -> u32 {
        self.todos.iter().map(|todo| todo.id).max().map_or(1, after)
    }
}


#[inline]
pub(crate) fn after(id: u32) -> u32 {
    id.checked_add(1).unwrap_or(1)
}
