mod http;
mod notify;

pub use self::http::{
    validate_header_value, HttpError, HttpOutput, ValidatedUrl,
    MAX_HEADER_VALUE_LENGTH, MAX_URL_LENGTH,
};
pub use self::notify::{Notify, NotifyOperation};

pub use crux_core::render::{Render, RenderOperation};
pub use crux_http::Http;

use crux_core::capability::ProtoContext;
use crux_core::Request;
use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::event::Event;
use crate::model::ToastMessage;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppNotify = Notify<Event>;

pub struct Capabilities {
    pub http: AppHttp,
    pub render: AppRender,
    pub notify: AppNotify,
}

// Written out rather than derived: crux_macros 0.3 emits
// `WithContext<Event, _>`, while crux_core 0.7.6 keys the trait on the app.

#[derive(Debug)]
pub enum Effect {
    Http(Request<crux_http::protocol::HttpRequest>),
    Render(Request<RenderOperation>),
    Notify(Request<NotifyOperation>),
}

/// Serialisable mirror of [`Effect`] for foreign shells.
#[derive(Serialize, Deserialize)]
#[serde(rename = "Effect")]
pub enum EffectFfi {
    Http(crux_http::protocol::HttpRequest),
    Render(RenderOperation),
    Notify(NotifyOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, crux_core::bridge::ResolveSerialized) {
        match self {
            Self::Http(request) => request.serialize(EffectFfi::Http),
            Self::Render(request) => request.serialize(EffectFfi::Render),
            Self::Notify(request) => request.serialize(EffectFfi::Notify),
        }
    }
}

impl crux_core::WithContext<App, Effect> for Capabilities {
    fn new_with_context(context: ProtoContext<Effect, Event>) -> Capabilities {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            render: Render::new(context.specialize(Effect::Render)),
            notify: Notify::new(context.specialize(Effect::Notify)),
        }
    }
}

impl Effect {
    #[must_use]
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    #[must_use]
    pub fn into_http(self) -> Option<Request<crux_http::protocol::HttpRequest>> {
        match self {
            Self::Http(request) => Some(request),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_notification(&self) -> Option<&ToastMessage> {
        match self {
            Self::Notify(request) => Some(&request.operation.toast),
            _ => None,
        }
    }
}
