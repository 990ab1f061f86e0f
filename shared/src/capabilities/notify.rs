//! Fire-and-forget notifications for the shell.
//!
//! The shell shows the toast however it likes (a banner, a line on stderr)
//! and answers nothing; the model keeps its own copy for the view.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::model::ToastMessage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyOperation {
    pub toast: ToastMessage,
}

impl Operation for NotifyOperation {
    type Output = ();
}

pub struct Notify<E> {
    context: CapabilityContext<NotifyOperation, E>,
}

impl<Ev> Clone for Notify<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Notify<Ev> {
    type Operation = NotifyOperation;
    type MappedSelf<MappedEv> = Notify<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Notify::new(self.context.map_event(f))
    }
}

impl<E> Notify<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<NotifyOperation, E>) -> Self {
        Self { context }
    }

    pub fn show(&self, toast: ToastMessage) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(NotifyOperation { toast }).await;
        });
    }
}
