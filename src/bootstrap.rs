use discard::DiscardOnDrop;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::application::{Application, Init};
use crate::config::{Config, MalformedPolicy};
use crate::error::{Error, Result};
use crate::mount::MountResolver;
use crate::ports::Subscription;
use crate::storage::Store;


/// Starts an application from persisted state and keeps that state persisted.
#[derive(Debug, Clone)]
pub struct Bootstrap<S> {
    config: Config,
    store: S,
}

impl<S> Bootstrap<S> where S: Store + Clone + 'static {
    #[inline]
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the stored state.
    ///
    /// A missing key, an empty string, and `null` all mean "nothing stored".
    pub fn load_flags<F>(&self) -> Result<Option<F>> where F: DeserializeOwned {
        let key = &*self.config.storage_key;

        let raw = match self.store.get(key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                debug!(key, "no stored state");
                return Ok(None);
            },
        };

        match serde_json::from_str::<Option<F>>(&raw) {
            Ok(flags) => {
                debug!(key, bytes = raw.len(), "loaded stored state");
                Ok(flags)
            },
            Err(source) => match self.config.on_malformed {
                MalformedPolicy::Fail => {
                    error!(key, %source, "stored state could not be read");
                    Err(Error::MalformedState { key: key.to_owned(), source })
                },
                MalformedPolicy::Discard => {
                    warn!(key, %source, "discarding stored state that could not be read");
                    Ok(None)
                },
            },
        }
    }

    pub fn resolve_mount<R>(&self, resolver: &R) -> Result<R::Node> where R: MountResolver {
        let id = &*self.config.mount_id;

        resolver.resolve(id).ok_or_else(|| {
            error!(id, "mount node is missing");
            Error::MissingMountNode(id.to_owned())
        })
    }

    /// Writes every state sent on the configured port back into the store.
    pub fn subscribe<A>(&self, app: &A) -> Result<DiscardOnDrop<Subscription<A::State>>> where A: Application {
        let port = app.ports().get(&self.config.port)
            .ok_or_else(|| Error::MissingPort(self.config.port.to_string()))?;

        let store = self.store.clone();
        let key = self.config.storage_key.clone();

        Ok(port.subscribe(move |state| {
            persist(&store, &key, state)
        }))
    }

    /// Loads the flags, mounts the application, and subscribes to its persistence port.
    pub fn run<A, R>(&self, resolver: &R) -> Result<Running<A>>
        where A: Application,
              R: MountResolver<Node = A::Node> {

        let flags = self.load_flags::<A::Flags>()?;
        let node = self.resolve_mount(resolver)?;

        debug!(id = &*self.config.mount_id, has_flags = flags.is_some(), "initializing application");
        let app = A::init(Init { flags, node });

        let subscription = self.subscribe(&app)?;
        debug!(port = &*self.config.port, "subscribed to persistence port");

        Ok(Running { app, subscription })
    }
}


fn persist<S, A>(store: &S, key: &str, state: &A) -> Result<()> where S: Store, A: Serialize + ?Sized {
    let json = serde_json::to_string(state).map_err(Error::Encode)?;

    store.set(key, &json).map_err(|e| {
        error!(key, error = %e, "failed to persist state");
        e
    })
}


/// A mounted application together with its persistence subscription.
///
/// Dropping this unsubscribes; use [`Running::leak`] to keep persisting for
/// the lifetime of the page.
#[must_use]
pub struct Running<A> where A: Application {
    app: A,
    subscription: DiscardOnDrop<Subscription<A::State>>,
}

impl<A> Running<A> where A: Application {
    #[inline]
    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn leak(self) -> A {
        DiscardOnDrop::leak(self.subscription);
        self.app
    }
}
