//! Browser bindings: one page-wide scroll listener feeding every mounted stage.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;

use gloo_net::http::Request;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Element, HtmlElement, Window};

use crate::contact::{ContactError, ContactResponse, ContactSubmission};
use crate::content::ContentItem;
use crate::hub::{ProgressHub, Subscription};
use crate::progress::{Region, ScrollMetrics};
use crate::stage::{Stage, StageFrame, StageKind};

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Logs through tracing and the browser console, which has no subscriber of its own.
fn console_warn(message: &str) {
    warn!("{}", message);
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn read_metrics(window: &Window) -> ScrollMetrics {
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let viewport_height = window
        .inner_height()
        .ok()
        .and_then(|height| height.as_f64())
        .unwrap_or(0.0);

    ScrollMetrics::new(scroll_y, viewport_height)
}

fn measure(element: &Element, window: &Window) -> Region {
    let rect = element.get_bounding_client_rect();
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    Region::new(rect.top() + scroll_y, rect.height())
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(error) = element.style().set_property(property, value) {
        console_warn(&format!("failed to set {property}: {error:?}"));
    }
}

fn query_all(container: &Element, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let nodes = container.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

fn query_one(container: &Element, selector: &str) -> Result<Option<HtmlElement>, JsValue> {
    Ok(container
        .query_selector(selector)?
        .and_then(|element| element.dyn_into::<HtmlElement>().ok()))
}

/// Elements a stage writes to on every frame.
struct StageElements {
    scenes: Vec<HtmlElement>,
    intro: Option<HtmlElement>,
    outro: Option<HtmlElement>,
    pose: Option<HtmlElement>,
}

impl StageElements {
    fn find(container: &Element) -> Result<Self, JsValue> {
        Ok(Self {
            scenes: query_all(container, "[data-scene]")?,
            intro: query_one(container, "[data-intro]")?,
            outro: query_one(container, "[data-outro]")?,
            pose: query_one(container, "[data-pose]")?,
        })
    }

    fn apply(&self, stage: &Stage, frame: &StageFrame) {
        if let Some(intro) = &self.intro {
            set_style(intro, "opacity", &format!("{:.4}", frame.intro_opacity));
        }
        if let Some(outro) = &self.outro {
            set_style(outro, "opacity", &format!("{:.4}", frame.outro_opacity));
        }
        if let (Some(element), Some(pose)) = (&self.pose, &frame.pose) {
            set_style(element, "transform", &pose.to_css());
        }

        match stage.tunnel() {
            Some(camera) => {
                for (index, (element, item)) in self.scenes.iter().zip(&frame.tunnel).enumerate() {
                    set_style(element, "opacity", &format!("{:.4}", item.opacity));
                    set_style(
                        element,
                        "transform",
                        &item.css_transform(camera.item_position(index)),
                    );
                    set_style(
                        element,
                        "visibility",
                        if item.visible { "visible" } else { "hidden" },
                    );
                }
            }
            None => {
                for (element, state) in self.scenes.iter().zip(&frame.scenes) {
                    set_style(element, "opacity", &format!("{:.4}", state.opacity));
                    set_style(element, "transform", &state.css_transform());
                    set_style(
                        element,
                        "pointer-events",
                        if state.is_visible() { "auto" } else { "none" },
                    );
                }
            }
        }
    }
}

struct MountedStage {
    container: Element,
    subscription: Subscription,
}

/// Owns the page's single scroll subscription. Create one per page and mount
/// each pinned section on it; freeing it detaches the listeners.
#[wasm_bindgen]
pub struct PageShell {
    hub: ProgressHub,
    window: Window,
    mounted: Rc<RefCell<Vec<MountedStage>>>,
    on_scroll: Closure<dyn FnMut()>,
    on_resize: Closure<dyn FnMut()>,
    _flush: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl PageShell {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<PageShell, JsValue> {
        let window = web_sys::window().ok_or_else(|| to_js("no window"))?;
        let hub = ProgressHub::new();
        let mounted: Rc<RefCell<Vec<MountedStage>>> = Rc::new(RefCell::new(Vec::new()));
        let requested = Rc::new(Cell::new(false));

        let flush = {
            let hub = hub.clone();
            let requested = Rc::clone(&requested);
            Closure::<dyn FnMut()>::new(move || {
                requested.set(false);
                hub.flush();
            })
        };
        let flush_fn: js_sys::Function = flush.as_ref().unchecked_ref::<js_sys::Function>().clone();

        // scroll events only record the reading; rendering waits for the next frame
        let schedule = {
            let hub = hub.clone();
            let window = window.clone();
            move || {
                hub.publish(read_metrics(&window));
                if !requested.replace(true) && window.request_animation_frame(&flush_fn).is_err()
                {
                    requested.set(false);
                }
            }
        };

        let on_resize = {
            let window = window.clone();
            let mounted = Rc::clone(&mounted);
            let schedule = schedule.clone();
            Closure::<dyn FnMut()>::new(move || {
                for stage in mounted.borrow().iter() {
                    stage
                        .subscription
                        .set_region(measure(&stage.container, &window));
                }
                schedule();
            })
        };
        let on_scroll = Closure::<dyn FnMut()>::new(schedule);

        window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

        Ok(PageShell {
            hub,
            window,
            mounted,
            on_scroll,
            on_resize,
            _flush: flush,
        })
    }

    /// Binds the element `container_id` to a stage of `kind` built from
    /// `items_json`. Scene elements are the container's `[data-scene]` children
    /// in document order.
    #[wasm_bindgen(js_name = mountStage)]
    pub fn mount_stage(
        &mut self,
        container_id: &str,
        kind: &str,
        items_json: &str,
    ) -> Result<(), JsValue> {
        let kind = StageKind::from_str(kind).map_err(to_js)?;
        let items: Vec<ContentItem> = serde_json::from_str(items_json).map_err(to_js)?;
        let stage = Stage::preset(kind, items).map_err(to_js)?;

        let container = self
            .window
            .document()
            .and_then(|document| document.get_element_by_id(container_id))
            .ok_or_else(|| to_js(format!("no element with id {container_id}")))?;
        let elements = StageElements::find(&container)?;

        let region = measure(&container, &self.window);
        let subscription = self.hub.subscribe(region, move |progress| {
            elements.apply(&stage, &stage.frame(progress));
        });

        self.mounted.borrow_mut().push(MountedStage {
            container,
            subscription,
        });

        // render the initial state without waiting for a scroll
        self.hub.publish(read_metrics(&self.window));
        self.hub.flush();

        Ok(())
    }

    #[wasm_bindgen(js_name = stageCount)]
    pub fn stage_count(&self) -> usize {
        self.mounted.borrow().len()
    }
}

impl Drop for PageShell {
    fn drop(&mut self) {
        let _ = self.window.remove_event_listener_with_callback(
            "scroll",
            self.on_scroll.as_ref().unchecked_ref(),
        );
        let _ = self.window.remove_event_listener_with_callback(
            "resize",
            self.on_resize.as_ref().unchecked_ref(),
        );
        self.mounted.borrow_mut().clear();
    }
}

async fn send_contact(endpoint: &str, payload_json: &str) -> ContactResponse {
    let submission = match serde_json::from_str::<ContactSubmission>(payload_json) {
        Ok(submission) => submission,
        Err(error) => return ContactResponse::rejected(&ContactError::Malformed(error.to_string())),
    };
    if let Err(error) = submission.validate() {
        return ContactResponse::rejected(&error);
    }

    let request = match Request::post(endpoint).json(&submission) {
        Ok(request) => request,
        Err(error) => {
            console_warn(&format!("failed to build contact request: {error}"));
            return ContactResponse::failed();
        }
    };

    match request.send().await {
        Ok(response) => response.json::<ContactResponse>().await.unwrap_or_else(|error| {
            console_warn(&format!("unreadable contact response: {error}"));
            ContactResponse::failed()
        }),
        Err(error) => {
            console_warn(&format!("contact request failed: {error}"));
            ContactResponse::failed()
        }
    }
}

/// Validates locally, posts to `endpoint`, and resolves to the response as json.
#[wasm_bindgen(js_name = submitContact)]
pub fn submit_contact(endpoint: String, payload_json: String) -> js_sys::Promise {
    future_to_promise(async move {
        let response = send_contact(&endpoint, &payload_json).await;
        serde_json::to_string(&response)
            .map(|body| JsValue::from_str(&body))
            .map_err(to_js)
    })
}
