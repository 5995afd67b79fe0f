//! Outbound notification channels.
//!
//! A [`Port`] is how an application tells the outside world that something
//! happened. Subscribers run synchronously inside [`Port::send`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use discard::{Discard, DiscardOnDrop};

use crate::error::{Error, Result};


type Callback<A> = Rc<RefCell<dyn FnMut(&A) -> Result<()>>>;

struct Subscribers<A> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<A>)>,
}


pub struct Port<A> {
    subscribers: Rc<RefCell<Subscribers<A>>>,
}

impl<A> Port<A> {
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                callbacks: vec![],
            })),
        }
    }

    /// The callback stays registered until the returned handle is discarded.
    pub fn subscribe<F>(&self, callback: F) -> DiscardOnDrop<Subscription<A>>
        where F: FnMut(&A) -> Result<()> + 'static {

        let callback: Callback<A> = Rc::new(RefCell::new(callback));

        let mut subscribers = self.subscribers.borrow_mut();

        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.callbacks.push((id, callback));

        DiscardOnDrop::new(Subscription {
            id,
            subscribers: Rc::downgrade(&self.subscribers),
        })
    }

    /// Calls every subscriber in order and stops at the first error.
    ///
    /// A subscriber that sends on the same port gets [`Error::ReentrantSend`].
    pub fn send(&self, value: &A) -> Result<()> {
        // Snapshot so callbacks can subscribe or unsubscribe while running
        let callbacks: Vec<Callback<A>> = self.subscribers.borrow().callbacks.iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in callbacks {
            let mut callback = callback.try_borrow_mut().map_err(|_| Error::ReentrantSend)?;
            (&mut *callback)(value)?;
        }

        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().callbacks.len()
    }
}

impl<A> Clone for Port<A> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<A> Default for Port<A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Port<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}


#[must_use]
pub struct Subscription<A> {
    id: u64,
    subscribers: Weak<RefCell<Subscribers<A>>>,
}

impl<A> Discard for Subscription<A> {
    fn discard(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.borrow_mut().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

impl<A> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}


/// Named ports exposed by an application.
pub struct Ports<A> {
    ports: BTreeMap<String, Port<A>>,
}

impl<A> Ports<A> {
    #[inline]
    pub fn new() -> Self {
        Self { ports: BTreeMap::new() }
    }

    #[inline]
    pub fn with<N>(mut self, name: N, port: Port<A>) -> Self where N: Into<String> {
        self.ports.insert(name.into(), port);
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Port<A>> {
        self.ports.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ports.keys().map(|name| name.as_str())
    }
}

impl<A> Default for Ports<A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Ports<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.ports.iter()).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<i32>>>, impl FnMut(&i32) -> Result<()>) {
        let seen = Rc::new(RefCell::new(vec![]));
        let callback = {
            let seen = seen.clone();
            move |value: &i32| {
                seen.borrow_mut().push(*value);
                Ok(())
            }
        };
        (seen, callback)
    }

    #[test]
    fn send_reaches_subscribers_in_order() {
        let port = Port::new();
        let order = Rc::new(RefCell::new(vec![]));

        let first = port.subscribe({
            let order = order.clone();
            move |value: &i32| { order.borrow_mut().push(("first", *value)); Ok(()) }
        });

        let second = port.subscribe({
            let order = order.clone();
            move |value: &i32| { order.borrow_mut().push(("second", *value)); Ok(()) }
        });

        port.send(&1).unwrap();
        port.send(&2).unwrap();

        assert_eq!(*order.borrow(), vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]);

        drop(first);
        drop(second);
    }

    #[test]
    fn dropping_the_subscription_unsubscribes() {
        let port = Port::new();
        let (seen, callback) = recorder();

        let subscription = port.subscribe(callback);
        port.send(&1).unwrap();
        assert_eq!(port.subscriber_count(), 1);

        drop(subscription);
        port.send(&2).unwrap();

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(port.subscriber_count(), 0);
    }

    #[test]
    fn leaked_subscription_stays() {
        let port = Port::new();
        let (seen, callback) = recorder();

        DiscardOnDrop::leak(port.subscribe(callback));

        port.send(&7).unwrap();
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn first_error_stops_delivery() {
        let port = Port::new();
        let (seen, callback) = recorder();

        let failing = port.subscribe(|_: &i32| Err(Error::MissingPort("nope".to_owned())));
        let recording = port.subscribe(callback);

        assert!(matches!(port.send(&1), Err(Error::MissingPort(_))));
        assert!(seen.borrow().is_empty());

        drop(failing);
        drop(recording);
    }

    #[test]
    fn subscribe_during_send() {
        let port: Port<i32> = Port::new();
        let (seen, callback) = recorder();
        let late = Rc::new(RefCell::new(None));

        let outer = port.subscribe({
            let port = port.clone();
            let late = late.clone();
            let mut callback = Some(callback);
            move |_: &i32| {
                if let Some(callback) = callback.take() {
                    *late.borrow_mut() = Some(port.subscribe(callback));
                }
                Ok(())
            }
        });

        port.send(&1).unwrap();
        port.send(&2).unwrap();

        assert_eq!(*seen.borrow(), vec![2]);

        drop(outer);
    }

    #[test]
    fn send_from_a_subscriber_is_an_error() {
        let port: Port<i32> = Port::new();
        let inner = Rc::new(RefCell::new(None));

        let subscription = port.subscribe({
            let port = port.clone();
            let inner = inner.clone();
            move |value: &i32| {
                if *value == 0 {
                    *inner.borrow_mut() = Some(port.send(&1));
                }
                Ok(())
            }
        });

        port.send(&0).unwrap();
        assert!(matches!(*inner.borrow(), Some(Err(Error::ReentrantSend))));

        // Still usable afterwards
        port.send(&2).unwrap();

        drop(subscription);
    }

    #[test]
    fn ports_by_name() {
        let port: Port<i32> = Port::new();
        let ports = Ports::new().with("setStorage", port.clone());

        assert!(ports.get("setStorage").is_some());
        assert!(ports.get("other").is_none());
        assert_eq!(ports.names().collect::<Vec<_>>(), vec!["setStorage"]);
    }
}
