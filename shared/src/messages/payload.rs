use std::{any::Any, fmt::Debug};

use runt_serde::{BitWrite, Serde};

/// The inner content of an Update Message.
///
/// Every `Serde` type that is `Debug + Send + Sync + 'static` is a `Payload`;
/// it still has to be registered with the `Protocol` before it can cross the
/// wire.
pub trait Payload: Any + Send + Sync + Debug {
    /// Writes the payload body (without any kind tag or framing)
    fn write(&self, writer: &mut dyn BitWrite);
    fn clone_boxed(&self) -> Box<dyn Payload>;
    fn dyn_eq(&self, other: &dyn Payload) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T> Payload for T
where
    T: Serde + Debug + Send + Sync + 'static,
{
    fn write(&self, writer: &mut dyn BitWrite) {
        self.ser(writer);
    }

    fn clone_boxed(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn Payload) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn Payload {
    pub fn downcast_ref<T: Payload>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Payload>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Clone for Box<dyn Payload> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl PartialEq for dyn Payload {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}
