// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Reference-counted opaque containers, as handed out by the host runtime.
//!
//! A [`Capsule`] pairs a name with a payload and an optional destructor.
//! Cloning a capsule adds a reference; when the last reference is dropped
//! the destructor receives the payload. The reference count is the only
//! record of whether the payload is alive.

use core::fmt;
use std::{any::Any, sync::Arc};

type Payload = Box<dyn Any + Send + Sync>;
type Destructor = Box<dyn FnOnce(Payload) + Send + Sync>;

#[derive(Clone)]
pub struct Capsule {
    inner: Arc<Inner>,
}

struct Inner {
    name: &'static str,
    payload: Option<Payload>,
    destructor: Option<Destructor>,
}

impl Capsule {
    /// Creates a capsule holding `payload`. The payload is simply dropped
    /// with the last reference.
    pub fn new<T: Any + Send + Sync>(name: &'static str, payload: T) -> Self {
        Self::build(name, Box::new(payload), None)
    }

    /// Creates a capsule whose `destructor` receives the payload once the
    /// last reference is gone.
    pub fn with_destructor<T, F>(name: &'static str, payload: T, destructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnOnce(T) + Send + Sync + 'static,
    {
        let destructor: Destructor = Box::new(move |payload: Payload| {
            if let Ok(payload) = payload.downcast::<T>() {
                destructor(*payload);
            }
        });
        Self::build(name, Box::new(payload), Some(destructor))
    }

    fn build(name: &'static str, payload: Payload, destructor: Option<Destructor>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                payload: Some(payload),
                destructor,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Whether the capsule carries the given name.
    pub fn is_valid(&self, name: &str) -> bool {
        self.inner.name == name
    }

    /// Borrows the payload if the capsule has the given name and holds a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        if !self.is_valid(name) {
            return None;
        }
        self.inner.payload.as_deref()?.downcast_ref::<T>()
    }

    /// Number of live references to this capsule.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let (Some(destructor), Some(payload)) = (self.destructor.take(), self.payload.take()) {
            destructor(payload);
        }
    }
}

impl fmt::Debug for Capsule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Capsule")
            .field("name", &self.inner.name)
            .field("refs", &self.ref_count())
            .finish()
    }
}
