use std::rc::Rc;
use std::cell::Cell;

use wasm_bindgen::prelude::*;
use futures_signals::signal::{Signal, SignalExt, Mutable};
use futures_signals::signal_vec::{SignalVec, SignalVecExt, MutableVec};
use dominator::{Dom, text_signal, html, clone, events, with_node};
use web_sys::{Element, HtmlInputElement};

use crate::application::{Application, Init};
use crate::config::SET_STORAGE;
use crate::error::Result;
use crate::ports::{Port, Ports};
use crate::state::{State, after};
use crate::todo::Todo;
use crate::util::trim;


/// The todo list. Every change sends the whole list on the `setStorage` port.
#[derive(Debug)]
pub struct App {
    next_id: Cell<u32>,
    new_todo_text: Mutable<String>,
    todos: MutableVec<Rc<Todo>>,
    set_storage: Port<State>,
    ports: Ports<State>,
}

impl App {
    pub fn new(flags: Option<State>) -> Rc<Self> {
        let state = flags.unwrap_or_default();
        let set_storage = Port::new();

        Rc::new(Self {
            next_id: Cell::new(state.next_id()),
            new_todo_text: Mutable::new(String::new()),
            todos: MutableVec::new_with_values(state.todos.iter().map(Todo::from_item).collect()),
            ports: Ports::new().with(SET_STORAGE, set_storage.clone()),
            set_storage,
        })
    }

    pub fn snapshot(&self) -> State {
        State {
            todos: self.todos.lock_ref().iter().map(|todo| todo.to_item()).collect(),
        }
    }

    fn persist(&self) -> Result<()> {
        self.set_storage.send(&self.snapshot())
    }

    fn find(&self, id: u32) -> Option<Rc<Todo>> {
        self.todos.lock_ref().iter().find(|todo| todo.id == id).cloned()
    }

    fn take_id(&self) -> u32 {
        let todos = self.todos.lock_ref();

        let mut id = self.next_id.get();

        while todos.iter().any(|todo| todo.id == id) {
            id = after(id);
        }

        self.next_id.set(after(id));
        id
    }

    /// Returns `false` if `text` is blank.
    pub fn add_todo(&self, text: &str) -> Result<bool> {
        match trim(text) {
            Some(text) => {
                let id = self.take_id();
                self.todos.lock_mut().push_cloned(Todo::new(id, text.to_owned()));

                self.persist()?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    pub fn set_done(&self, id: u32, done: bool) -> Result<()> {
        if let Some(todo) = self.find(id) {
            todo.done.set_neq(done);
            self.persist()?;
        }

        Ok(())
    }

    pub fn set_all_done(&self, done: bool) -> Result<()> {
        for todo in self.todos.lock_ref().iter() {
            todo.done.set_neq(done);
        }

        self.persist()
    }

    /// Blank text removes the todo.
    pub fn rename(&self, id: u32, text: &str) -> Result<()> {
        match trim(text) {
            Some(text) => {
                if let Some(todo) = self.find(id) {
                    todo.text.set_neq(text.to_owned());
                    self.persist()?;
                }

                Ok(())
            },
            None => self.remove(id),
        }
    }

    pub fn remove(&self, id: u32) -> Result<()> {
        let removed = {
            let mut todos = self.todos.lock_mut();
            let len = todos.len();
            todos.retain(|todo| todo.id != id);
            todos.len() != len
        };

        if removed {
            self.persist()?;
        }

        Ok(())
    }

    pub fn clear_completed(&self) -> Result<()> {
        self.todos.lock_mut().retain(|todo| !todo.done.get());
        self.persist()
    }

    fn create_new_todo(&self) -> Result<()> {
        let text = self.new_todo_text.get_cloned();

        if self.add_todo(&text)? {
            self.new_todo_text.set_neq(String::new());
        }

        Ok(())
    }

    fn done(&self) -> impl SignalVec<Item = bool> {
        self.todos.signal_vec_cloned()
            .map_signal(|todo| todo.done.signal())
    }

    fn done_len(&self) -> impl Signal<Item = usize> {
        self.done()
            .filter(|done| *done)
            .len()
    }

    fn not_done_len(&self) -> impl Signal<Item = usize> {
        self.done()
            .filter(|done| !done)
            .len()
    }

    fn has_todos(&self) -> impl Signal<Item = bool> {
        self.todos.signal_vec_cloned()
            .len()
            .map(|len| len > 0)
            .dedupe()
    }

    fn render_header(app: &Rc<Self>) -> Dom {
        html!("header", {
            .class("header")
            .children(&mut [
                html!("h1", {
                    .text("todos")
                }),

                html!("input" => HtmlInputElement, {
                    .focused(true)
                    .class("new-todo")
                    .attr("placeholder", "What needs to be done?")
                    .prop_signal("value", app.new_todo_text.signal_cloned())

                    .with_node!(element => {
                        .event(clone!(app => move |_: events::Input| {
                            app.new_todo_text.set_neq(element.value());
                        }))
                    })

                    .event(clone!(app => move |event: events::KeyDown| {
                        if event.key() == "Enter" {
                            app.create_new_todo().unwrap_throw();
                        }
                    }))
                }),
            ])
        })
    }

    fn render_main(app: &Rc<Self>) -> Dom {
        html!("section", {
            .class("main")
            .visible_signal(app.has_todos())

            .children(&mut [
                html!("input" => HtmlInputElement, {
                    .class("toggle-all")
                    .attr("id", "toggle-all")
                    .attr("type", "checkbox")
                    .prop_signal("checked", app.not_done_len().map(|len| len == 0))

                    .with_node!(element => {
                        .event(clone!(app => move |_: events::Change| {
                            app.set_all_done(element.checked()).unwrap_throw();
                        }))
                    })
                }),

                html!("label", {
                    .attr("for", "toggle-all")
                    .text("Mark all as complete")
                }),

                html!("ul", {
                    .class("todo-list")
                    .children_signal_vec(app.todos.signal_vec_cloned()
                        .map(clone!(app => move |todo| Todo::render(todo, app.clone()))))
                }),
            ])
        })
    }

    fn render_footer(app: &Rc<Self>) -> Dom {
        html!("footer", {
            .class("footer")
            .visible_signal(app.has_todos())

            .children(&mut [
                html!("span", {
                    .class("todo-count")

                    .children(&mut [
                        html!("strong", {
                            .text_signal(app.not_done_len().map(|len| len.to_string()))
                        }),

                        text_signal(app.not_done_len().map(|len| {
                            if len == 1 {
                                " item left"
                            } else {
                                " items left"
                            }
                        })),
                    ])
                }),

                html!("button", {
                    .class("clear-completed")

                    // Only when something is done
                    .visible_signal(app.done_len().map(|len| len > 0))

                    .event(clone!(app => move |_: events::Click| {
                        app.clear_completed().unwrap_throw();
                    }))

                    .text("Clear completed")
                }),
            ])
        })
    }

    pub fn render(app: Rc<Self>) -> Dom {
        html!("section", {
            .class("todoapp")
            .children(&mut [
                Self::render_header(&app),
                Self::render_main(&app),
                Self::render_footer(&app),
            ])
        })
    }
}

impl Application for Rc<App> {
    type Flags = State;
    type State = State;
    type Node = Element;

    fn init(init: Init<State, Element>) -> Self {
        let app = App::new(init.flags);
        dominator::append_dom(&init.node, App::render(app.clone()));
        app
    }

    #[inline]
    fn ports(&self) -> &Ports<State> {
        &self.ports
    }
}


#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use discard::DiscardOnDrop;

    use super::*;
    use crate::state::TodoItem;

    fn record(app: &App) -> Rc<RefCell<Vec<State>>> {
        let sent = Rc::new(RefCell::new(vec![]));

        let port = app.ports.get(SET_STORAGE).unwrap();

        DiscardOnDrop::leak(port.subscribe(clone!(sent => move |state: &State| {
            sent.borrow_mut().push(state.clone());
            Ok(())
        })));

        sent
    }

    fn item(id: u32, text: &str, done: bool) -> TodoItem {
        TodoItem { id, text: text.to_owned(), done }
    }

    #[test]
    fn starts_empty_without_flags() {
        let app = App::new(None);
        assert_eq!(app.snapshot(), State::default());
        assert_eq!(app.next_id.get(), 1);
    }

    #[test]
    fn starts_from_flags() {
        let flags = State { todos: vec![item(3, "milk", true)] };
        let app = App::new(Some(flags.clone()));

        assert_eq!(app.snapshot(), flags);
        assert_eq!(app.next_id.get(), 4);
    }

    #[test]
    fn add_sends_the_whole_list() {
        let app = App::new(None);
        let sent = record(&app);

        assert!(app.add_todo(" milk ").unwrap());
        assert!(app.add_todo("eggs").unwrap());
        assert!(!app.add_todo("   ").unwrap());

        let sent = sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], State { todos: vec![item(1, "milk", false)] });
        assert_eq!(sent[1], State { todos: vec![item(1, "milk", false), item(2, "eggs", false)] });
    }

    #[test]
    fn toggling_and_clearing() {
        let app = App::new(Some(State { todos: vec![item(1, "milk", false), item(2, "eggs", false)] }));
        let sent = record(&app);

        app.set_done(2, true).unwrap();
        assert_eq!(sent.borrow().last().unwrap().todos[1], item(2, "eggs", true));

        app.clear_completed().unwrap();
        assert_eq!(sent.borrow().last().unwrap(), &State { todos: vec![item(1, "milk", false)] });

        app.set_all_done(true).unwrap();
        assert_eq!(app.snapshot(), State { todos: vec![item(1, "milk", true)] });

        app.remove(1).unwrap();
        assert_eq!(sent.borrow().last().unwrap(), &State::default());
        assert_eq!(sent.borrow().len(), 4);
    }

    #[test]
    fn unknown_id_sends_nothing() {
        let app = App::new(None);
        let sent = record(&app);

        app.set_done(9, true).unwrap();
        app.rename(9, "x").unwrap();
        app.remove(9).unwrap();

        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn ids_after_max_reuse_free_ones() {
        let flags: State = serde_json::from_str(r#"{"todos":[{"id":4294967295,"text":"a","done":false},{"id":1,"text":"b","done":false}]}"#).unwrap();
        let app = App::new(Some(flags));

        app.add_todo("c").unwrap();
        app.add_todo("d").unwrap();

        let ids: Vec<u32> = app.snapshot().todos.iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![u32::MAX, 1, 2, 3]);
    }

    #[test]
    fn blank_rename_removes() {
        let app = App::new(Some(State { todos: vec![item(1, "milk", false), item(2, "eggs", false)] }));
        let sent = record(&app);

        app.rename(1, " oat milk ").unwrap();
        app.rename(2, "  ").unwrap();

        assert_eq!(sent.borrow().last().unwrap(), &State { todos: vec![item(1, "oat milk", false)] });
    }

    #[test]
    fn new_todo_input_clears_after_enter() {
        let app = App::new(None);
        let sent = record(&app);

        app.new_todo_text.set("bread".to_owned());
        app.create_new_todo().unwrap();

        assert_eq!(app.new_todo_text.get_cloned(), "");
        assert_eq!(sent.borrow()[0], State { todos: vec![item(1, "bread", false)] });
    }
}
