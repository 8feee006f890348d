use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use chrono::Utc;
use gloo_net::http::Request;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollToOptions, Storage,
};

use crate::ui::{
    anim::Animation,
    scroll::{ScrollMetrics, SectionOffset},
    state::Theme,
    store::KeyValueStore,
    viewport::{ViewportTrigger, VisibilityEvent, VisibilitySource, REVEAL_CLASS},
};
use crate::visit::{
    IpLookupReply, PageContext, VisitError, VisitTransport, VisitorRecord, IP_LOOKUP_URL,
    LOG_VISITOR_PATH,
};

pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

/// `localStorage`-backed store. Quota and privacy-mode errors are ignored.
#[derive(Clone, Copy, Default)]
pub struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, value);
        }
    }
}

fn media_matches(query: &str) -> bool {
    window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

pub fn system_prefers_dark() -> bool {
    media_matches("(prefers-color-scheme: dark)")
}

fn prefers_reduced_motion() -> bool {
    media_matches("(prefers-reduced-motion: reduce)")
}

pub fn apply_theme(theme: Theme) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    if let Some(root) = document.document_element() {
        let _ = root.set_attribute("data-theme", theme.as_str());
    }

    if let Some(body) = document.body() {
        let classes = body.class_list();
        let _ = match theme.body_class() {
            Some(class) => classes.add_1(class),
            None => classes.remove_1("dark-mode"),
        };
    }
}

pub fn apply_theme_with_transition(theme: Theme) {
    if prefers_reduced_motion() {
        apply_theme(theme);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        apply_theme(theme);
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        apply_theme(theme);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        apply_theme(theme);
        return;
    };

    let callback = Closure::once_into_js(move || apply_theme(theme));
    if start_view_transition
        .call1(&document_js, callback.unchecked_ref())
        .is_err()
    {
        apply_theme(theme);
    }
}

pub fn set_timeout(delay: Duration, callback: impl FnOnce() + 'static) {
    let Some(win) = window() else {
        return;
    };

    let callback = Closure::once_into_js(callback);
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis);
}

/// Drives an [`Animation`] with chained `setTimeout`s until it reports no
/// next delay.
pub fn run_animation<A>(animation: A, on_frame: impl Fn(A::Frame) + 'static)
where
    A: Animation + 'static,
{
    tick(Rc::new(RefCell::new(animation)), Rc::new(on_frame));
}

fn tick<A, F>(animation: Rc<RefCell<A>>, on_frame: Rc<F>)
where
    A: Animation + 'static,
    F: Fn(A::Frame) + 'static,
{
    let step = animation.borrow_mut().advance();
    on_frame(step.frame);

    if let Some(delay) = step.next {
        set_timeout(delay, move || tick(animation, on_frame));
    }
}

/// Removes its event listener when dropped.
pub struct ListenerGuard {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

pub fn listen(
    target: EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Option<ListenerGuard> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .ok()?;

    Some(ListenerGuard {
        target,
        event,
        closure,
    })
}

pub fn window_target() -> Option<EventTarget> {
    window().map(Into::into)
}

pub fn document_target() -> Option<EventTarget> {
    window().and_then(|w| w.document()).map(Into::into)
}

pub fn event_inside(event: &Event, selector: &str) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest(selector).ok().flatten())
        .is_some()
}

pub fn read_scroll_metrics() -> ScrollMetrics {
    let Some(win) = window() else {
        return ScrollMetrics::default();
    };

    let scroll_top = win.scroll_y().unwrap_or(0.0);
    let viewport_height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);

    let Some(document) = win.document() else {
        return ScrollMetrics::default();
    };

    let scroll_height = document
        .document_element()
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0);

    let mut sections = Vec::new();
    if let Ok(nodes) = document.query_selector_all("section[id]") {
        for index in 0..nodes.length() {
            let Some(section) = nodes
                .item(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            sections.push(SectionOffset {
                id: section.id(),
                top: f64::from(section.offset_top()),
            });
        }
    }

    ScrollMetrics {
        scroll_top,
        scroll_height,
        viewport_height,
        sections,
    }
}

pub fn scroll_to_top() {
    if let Some(win) = window() {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        win.scroll_to_with_scroll_to_options(&options);
    }
}

struct ObserverEvents {
    pending: Rc<RefCell<Vec<VisibilityEvent<String>>>>,
}

impl VisibilitySource<String> for ObserverEvents {
    fn take_events(&mut self) -> Vec<VisibilityEvent<String>> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

/// Calls `on_visible` once per element, the first time half of it is on
/// screen. Elements are keyed by their DOM id and get the reveal class.
pub fn observe_once(targets: Vec<Element>, on_visible: impl Fn(&Element) + 'static) {
    let mut trigger = ViewportTrigger::default();
    let mut elements = HashMap::new();
    for element in &targets {
        trigger.observe(element.id());
        elements.insert(element.id(), element.clone());
    }

    let trigger = Rc::new(RefCell::new(trigger));
    let pending = Rc::new(RefCell::new(Vec::new()));

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    pending.borrow_mut().push(VisibilityEvent {
                        key: entry.target().id(),
                        ratio: entry.intersection_ratio(),
                    });
                }
            }

            let mut source = ObserverEvents {
                pending: pending.clone(),
            };
            trigger.borrow_mut().drain(&mut source, |key| {
                if let Some(element) = elements.get(key) {
                    let _ = element.class_list().add_1(REVEAL_CLASS);
                    observer.unobserve(element);
                    on_visible(element);
                }
            });
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(crate::ui::viewport::VISIBILITY_THRESHOLD));

    let Ok(observer) = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
    else {
        console_log("IntersectionObserver unavailable");
        return;
    };

    for element in &targets {
        observer.observe(element);
    }

    // The observer lives for the page; so does its callback.
    callback.forget();
}

pub struct WebVisitTransport;

impl VisitTransport for WebVisitTransport {
    async fn lookup_ip(&self) -> Result<String, VisitError> {
        let response = Request::get(IP_LOOKUP_URL)
            .send()
            .await
            .map_err(|error| VisitError::Lookup(error.to_string()))?;
        let reply = response
            .json::<IpLookupReply>()
            .await
            .map_err(|error| VisitError::Lookup(error.to_string()))?;

        Ok(reply.ip)
    }

    async fn post_record(&self, record: &VisitorRecord) -> Result<(), VisitError> {
        Request::post(LOG_VISITOR_PATH)
            .json(record)
            .map_err(|error| VisitError::Transport(error.to_string()))?
            .send()
            .await
            .map(|_| ())
            .map_err(|error| VisitError::Transport(error.to_string()))
    }
}

pub fn page_context() -> PageContext {
    let win = window();
    let url = win
        .as_ref()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default();
    let user_agent = win
        .as_ref()
        .and_then(|w| w.navigator().user_agent().ok())
        .unwrap_or_default();

    PageContext {
        url,
        user_agent,
        now: Utc::now(),
    }
}
