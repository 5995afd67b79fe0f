use std::rc::Rc;

use wasm_bindgen::prelude::*;
use futures_signals::signal::{Signal, SignalExt, Mutable};
use dominator::{Dom, html, clone, events, with_node};
use web_sys::HtmlInputElement;

use crate::app::App;
use crate::state::TodoItem;


#[derive(Debug)]
pub struct Todo {
    pub(crate) id: u32,
    pub(crate) text: Mutable<String>,
    pub(crate) done: Mutable<bool>,
    editing: Mutable<Option<String>>,
}

impl Todo {
    pub fn new(id: u32, text: String) -> Rc<Self> {
        Self::from_item(&TodoItem { id, text, done: false })
    }

    pub fn from_item(item: &TodoItem) -> Rc<Self> {
        Rc::new(Self {
            id: item.id,
            text: Mutable::new(item.text.clone()),
            done: Mutable::new(item.done),
            editing: Mutable::new(None),
        })
    }

    pub fn to_item(&self) -> TodoItem {
        TodoItem {
            id: self.id,
            text: self.text.get_cloned(),
            done: self.done.get(),
        }
    }

    fn is_editing(&self) -> impl Signal<Item = bool> {
        self.editing.signal_ref(|x| x.is_some()).dedupe()
    }

    fn cancel_editing(&self) {
        self.editing.set_neq(None);
    }

    fn done_editing(&self, app: &App) {
        if let Some(text) = self.editing.replace(None) {
            app.rename(self.id, &text).unwrap_throw();
        }
    }

    pub fn render(todo: Rc<Self>, app: Rc<App>) -> Dom {
        html!("li", {
            .class_signal("editing", todo.is_editing())
            .class_signal("completed", todo.done.signal())

            .children(&mut [
                html!("div", {
                    .class("view")
                    .children(&mut [
                        html!("input" => HtmlInputElement, {
                            .class("toggle")
                            .attr("type", "checkbox")
                            .prop_signal("checked", todo.done.signal())

                            .with_node!(element => {
                                .event(clone!(todo, app => move |_: events::Change| {
                                    app.set_done(todo.id, element.checked()).unwrap_throw();
                                }))
                            })
                        }),

                        html!("label", {
                            .event(clone!(todo => move |_: events::DoubleClick| {
                                todo.editing.set_neq(Some(todo.text.get_cloned()));
                            }))

                            .text_signal(todo.text.signal_cloned())
                        }),

                        html!("button", {
                            .class("destroy")
                            .event(clone!(todo, app => move |_: events::Click| {
                                app.remove(todo.id).unwrap_throw();
                            }))
                        }),
                    ])
                }),

                html!("input" => HtmlInputElement, {
                    .class("edit")

                    .prop_signal("value", todo.editing.signal_cloned()
                        .map(|x| x.unwrap_or_default()))

                    .visible_signal(todo.is_editing())
                    .focused_signal(todo.is_editing())

                    .with_node!(element => {
                        .event(clone!(todo => move |event: events::KeyDown| {
                            match event.key().as_str() {
                                "Enter" => {
                                    element.blur().unwrap_throw();
                                },
                                "Escape" => {
                                    todo.cancel_editing();
                                },
                                _ => {}
                            }
                        }))
                    })

                    .with_node!(element => {
                        .event(clone!(todo => move |_: events::Input| {
                            todo.editing.set_neq(Some(element.value()));
                        }))
                    })

                    .event(clone!(todo, app => move |_: events::Blur| {
                        todo.done_editing(&app);
                    }))
                }),
            ])
        })
    }
}
