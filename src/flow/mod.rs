//! Flow controller. Owns the DOM for all four views, the state machine, the
//! RNG, and every scheduled timer. Event listeners and interval callbacks
//! mutate `FlowState` through a thread-local cell; a
//! `request_animation_frame` loop projects the state onto the DOM.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MouseEvent, window};

pub mod confetti;
pub mod evasion;
pub mod schedule;
pub mod state;
pub mod steps;

use evasion::{ClickVerdict, Point};
use schedule::{Scheduler, TaskKey};
use state::{FlowState, NoOutcome, View};
use steps::{EvasionTag, STEPS, TIMER_DURATION_SECS};

/// Countdown tick cadence (ms).
const COUNTDOWN_TICK_MS: u32 = 1_000;
/// How long SUCCESS lingers before the flow restarts at step 0 (ms).
const SUCCESS_RETURN_MS: u32 = 3_000;

// --- DOM handles --------------------------------------------------------------

struct Dom {
    root: Element,
    intro: Element,
    active: Element,
    success: Element,
    ending: Element,
    timer_text: Element,
    timer_ring: Element,
    prompt: Element,
    fail_caption: Element,
    buttons_area: Element,
    yes_button: Element,
}

struct FlowApp {
    state: FlowState,
    scheduler: Scheduler,
    rng: Pcg32,
    dom: Dom,
    /// Cleared on unmount/replacement; the render loop holds a clone and
    /// stops re-arming once its flag goes false.
    alive: Rc<Cell<bool>>,
}

thread_local! {
    static FLOW: RefCell<Option<FlowApp>> = RefCell::new(None);
}

/// Borrow the live app for the duration of one callback. State updates made
/// inside are visible to the next callback or render, never concurrently.
fn with_app(f: impl FnOnce(&mut FlowApp)) {
    FLOW.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            f(app);
        }
    });
}

// --- Mount / teardown ---------------------------------------------------------

pub fn start_flow_mode() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    // Replace any previous mount so its timers cannot pile up.
    stop_flow_mode();

    let dom = build_dom(&doc)?;
    body.append_child(&dom.root)?;
    attach_listeners(&dom)?;

    let seed = win
        .performance()
        .map(|p| p.now().to_bits())
        .unwrap_or(0x5eed);
    let alive = Rc::new(Cell::new(true));
    let app = FlowApp {
        state: FlowState::new(),
        scheduler: Scheduler::new(),
        rng: Pcg32::seed_from_u64(seed),
        dom,
        alive: alive.clone(),
    };
    FLOW.with(|cell| cell.replace(Some(app)));
    log::info!("valentine flow mounted ({} steps)", STEPS.len());

    start_render_loop(alive);
    Ok(())
}

/// Unmount the component and cancel every live timer. Safe to call twice.
pub fn stop_flow_mode() {
    FLOW.with(|cell| {
        if let Some(mut app) = cell.borrow_mut().take() {
            app.alive.set(false);
            app.scheduler.cancel_all();
            app.dom.root.remove();
            log::info!("valentine flow unmounted");
        }
    });
}

// --- Transitions & scheduled tasks --------------------------------------------

/// (Re)register the active view's task set: the countdown plus whatever the
/// step's evasion tag needs. Always swaps the previous set out first.
fn arm_active_tasks(app: &mut FlowApp) {
    let Some(step) = app.state.active_step() else {
        return;
    };
    app.scheduler.cancel_all();
    app.scheduler
        .every(TaskKey::Countdown, COUNTDOWN_TICK_MS, || {
            with_app(|app| {
                if let Some(outcome) = app.state.tick_countdown() {
                    log::debug!("countdown expired");
                    after_negative(app, outcome);
                }
            });
        });
    match STEPS[step].evasion {
        EvasionTag::Teleport => {
            app.scheduler
                .every(TaskKey::Relocate, evasion::TELEPORT_HOP_MS, || {
                    with_app(|app| relocate_control(app, None));
                });
        }
        EvasionTag::ShrinkAndWander => {
            app.scheduler
                .every(TaskKey::Relocate, evasion::WANDER_HOP_MS, || {
                    with_app(|app| relocate_control(app, Some(evasion::WANDER_SCALE)));
                });
        }
        EvasionTag::Flicker => {
            app.scheduler
                .every(TaskKey::Relocate, evasion::FLICKER_RELOCATE_MS, || {
                    with_app(|app| {
                        if app.state.flicker_visible {
                            relocate_control(app, None);
                        }
                    });
                });
            schedule_flicker_phase(app);
        }
        EvasionTag::Neutral | EvasionTag::Flee | EvasionTag::FadeOnApproach => {}
    }
}

/// Chained one-shots flipping the flicker phase: visible 1s, hidden 2s.
fn schedule_flicker_phase(app: &mut FlowApp) {
    let ms = if app.state.flicker_visible {
        evasion::FLICKER_VISIBLE_MS
    } else {
        evasion::FLICKER_HIDDEN_MS
    };
    app.scheduler.after(TaskKey::FlickerPhase, ms, || {
        with_app(|app| {
            if app.state.active_tag() == Some(EvasionTag::Flicker) {
                app.state.flicker_visible = !app.state.flicker_visible;
                schedule_flicker_phase(app);
            }
        });
    });
}

fn after_negative(app: &mut FlowApp, outcome: NoOutcome) {
    match outcome {
        NoOutcome::Advanced { step } => {
            log::debug!("advanced to step {step}");
            arm_active_tasks(app);
        }
        NoOutcome::Exhausted => {
            log::info!("sequence exhausted; final failure");
            app.scheduler.cancel_all();
        }
        NoOutcome::Ignored => {}
    }
}

fn enter_success(app: &mut FlowApp) {
    if !app.state.succeed() {
        return;
    }
    log::info!("activation accepted; celebrating");
    app.scheduler.cancel_all();
    app.scheduler
        .every(TaskKey::CelebrationBurst, confetti::BURST_EVERY_MS, || {
            confetti::fire(&confetti::SUCCESS_BURST);
        });
    app.scheduler
        .after(TaskKey::CelebrationStop, confetti::CELEBRATION_MS, || {
            with_app(|app| app.scheduler.cancel(TaskKey::CelebrationBurst));
        });
    app.scheduler
        .after(TaskKey::SuccessReturn, SUCCESS_RETURN_MS, || {
            with_app(|app| {
                if app.state.success_return() {
                    arm_active_tasks(app);
                }
            });
        });
}

/// Move the control to a fresh random in-bounds spot, optionally forcing a
/// render scale (shrink-and-wander).
fn relocate_control(app: &mut FlowApp, scale: Option<f64>) {
    if app.state.active_step().is_none() {
        return;
    }
    let bounds = area_bounds(app);
    let p = evasion::random_position(bounds, &mut app.rng);
    app.state.pose.x = p.x;
    app.state.pose.y = p.y;
    if scale.is_some() {
        app.state.pose.scale = scale;
    }
}

fn area_bounds(app: &FlowApp) -> evasion::Bounds {
    let rect = app.dom.buttons_area.get_bounding_client_rect();
    evasion::Bounds {
        width: rect.width(),
        height: rect.height(),
    }
}

// --- Event handlers -----------------------------------------------------------

fn on_affirmative_click(app: &mut FlowApp) {
    let Some(tag) = app.state.active_tag() else {
        return;
    };
    match evasion::resolve_click(tag, &mut app.rng) {
        ClickVerdict::Accept => enter_success(app),
        ClickVerdict::Relocate => relocate_control(app, None),
        ClickVerdict::Swallow => {}
    }
}

fn on_negative_click(app: &mut FlowApp) {
    let outcome = app.state.answer_no();
    after_negative(app, outcome);
}

fn on_pointer_move(app: &mut FlowApp, x: f64, y: f64) {
    let Some(step) = app.state.active_step() else {
        return;
    };
    let pointer = Point { x, y };
    let pos = Point {
        x: app.state.pose.x,
        y: app.state.pose.y,
    };
    let dist = evasion::distance(pointer, evasion::center_of(pos));
    match STEPS[step].evasion {
        EvasionTag::Teleport => {
            if evasion::teleport_should_relocate(dist) {
                relocate_control(app, None);
            }
        }
        EvasionTag::Flee => {
            let bounds = area_bounds(app);
            if let Some(p) = evasion::flee_from(pointer, pos, bounds, evasion::flee_params(step)) {
                app.state.pose.x = p.x;
                app.state.pose.y = p.y;
            }
        }
        EvasionTag::FadeOnApproach => {
            app.state.pose.opacity = Some(evasion::approach_opacity(dist));
        }
        EvasionTag::Neutral | EvasionTag::ShrinkAndWander | EvasionTag::Flicker => {}
    }
}

fn attach_click(target: &Element, f: impl FnMut(MouseEvent) + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(MouseEvent)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn attach_listeners(dom: &Dom) -> Result<(), JsValue> {
    attach_click(&dom.intro, |_| {
        with_app(|app| {
            if app.state.open() {
                log::debug!("letter opened");
                arm_active_tasks(app);
            }
        });
    })?;

    // Negative control: advances the sequence or ends it.
    if let Some(no_btn) = dom.active.query_selector("#vf-no")? {
        attach_click(&no_btn, |_| with_app(on_negative_click))?;
    }

    attach_click(&dom.yes_button, |evt| {
        evt.prevent_default();
        evt.stop_propagation();
        with_app(on_affirmative_click);
    })?;

    if let Some(restart) = dom.ending.query_selector("#vf-restart")? {
        attach_click(&restart, |_| {
            with_app(|app| {
                if app.state.restart() {
                    app.scheduler.cancel_all();
                    log::info!("flow restarted");
                }
            });
        })?;
    }

    // Pointer tracking feeds the evasion rules while a question is active.
    // Listens on the whole overlay so the control reacts before the pointer
    // ever reaches the card.
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            with_app(|app| {
                let rect = app.dom.buttons_area.get_bounding_client_rect();
                let x = evt.client_x() as f64 - rect.left();
                let y = evt.client_y() as f64 - rect.top();
                on_pointer_move(app, x, y);
            });
        }) as Box<dyn FnMut(MouseEvent)>);
        dom.root
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

// --- DOM construction & render ------------------------------------------------

const ROOT_STYLE: &str = "position:fixed; inset:0; display:flex; align-items:center; justify-content:center; background:linear-gradient(135deg,#ffdde1,#ee9ca7); font-family:'Segoe UI',sans-serif; z-index:10;";
const CARD_STYLE: &str = "background:#fff; border-radius:18px; box-shadow:0 12px 40px rgba(0,0,0,0.18); padding:28px 32px; text-align:center; max-width:560px; position:relative; z-index:12;";
const INTRO_STYLE: &str = "background:#fff6f8; border:2px solid #e8557e; border-radius:14px; box-shadow:0 12px 40px rgba(0,0,0,0.18); padding:44px 56px; text-align:center; cursor:pointer; position:relative; z-index:12;";
const TIMER_STYLE: &str = "position:relative; width:64px; height:64px; margin:0 auto 10px; display:flex; align-items:center; justify-content:center; font-size:18px; color:#e8557e; font-weight:bold;";

/// Circumference of the r=45 countdown ring in its 100x100 viewBox.
const TIMER_RING_CIRCUMFERENCE: f64 = 282.7;

/// Dash offset for the countdown ring: 0 with a full timer, the whole
/// circumference once it runs out.
fn ring_dashoffset(time_left: u32) -> f64 {
    let remaining = f64::from(time_left.min(TIMER_DURATION_SECS)) / f64::from(TIMER_DURATION_SECS);
    (1.0 - remaining) * TIMER_RING_CIRCUMFERENCE
}
const NO_BUTTON_STYLE: &str = "position:absolute; left:30px; top:95px; width:100px; height:50px; border:none; border-radius:10px; background:#8d8d8d; color:#fff; font-size:17px; cursor:pointer;";

fn el(doc: &Document, tag: &str, id: &str, style: &str) -> Result<Element, JsValue> {
    let e = doc.create_element(tag)?;
    e.set_id(id);
    e.set_attribute("style", style)?;
    Ok(e)
}

fn build_dom(doc: &Document) -> Result<Dom, JsValue> {
    let root = el(doc, "div", "vf-root", ROOT_STYLE)?;

    // Background heart decorations.
    let hearts = el(
        doc,
        "div",
        "vf-hearts",
        "position:absolute; inset:0; overflow:hidden; pointer-events:none; z-index:11;",
    )?;
    let mut hearts_html = String::new();
    for i in 0..12 {
        let left = 4 + (i * 83) % 92;
        let top = 6 + (i * 37) % 88;
        let size = 14 + (i * 5) % 18;
        hearts_html.push_str(&format!(
            "<span style='position:absolute; left:{left}%; top:{top}%; font-size:{size}px; opacity:0.35;'>💗</span>"
        ));
    }
    hearts.set_inner_html(&hearts_html);
    root.append_child(&hearts)?;

    // Intro letter.
    let intro = el(doc, "div", "vf-intro", INTRO_STYLE)?;
    intro.set_inner_html(
        "<h1 style='margin:0 0 6px; color:#c2335e;'>Happy Valentine's</h1>\
         <p style='margin:0 0 18px; color:#a06;'>(or not)</p>\
         <p style='margin:0; color:#888; font-size:14px;'>Click to open</p>",
    );
    root.append_child(&intro)?;

    // Active question card.
    let active = el(doc, "div", "vf-active", CARD_STYLE)?;
    let timer = el(doc, "div", "vf-timer", TIMER_STYLE)?;
    timer.set_inner_html(&format!(
        "<svg viewBox='0 0 100 100' style='position:absolute; inset:0; transform:rotate(-90deg);'>\
           <circle cx='50' cy='50' r='45' fill='none' stroke='#f3c1d1' stroke-width='8'/>\
           <circle id='vf-timer-ring' cx='50' cy='50' r='45' fill='none' stroke='#e8557e' \
             stroke-width='8' stroke-linecap='round' stroke-dasharray='{TIMER_RING_CIRCUMFERENCE}' \
             stroke-dashoffset='0' style='transition:stroke-dashoffset 1s linear;'/>\
         </svg>\
         <span id='vf-timer-text' style='position:relative;'></span>"
    ));
    let timer_ring = timer
        .query_selector("#vf-timer-ring")?
        .ok_or_else(|| JsValue::from_str("no timer ring"))?;
    let timer_text = timer
        .query_selector("#vf-timer-text")?
        .ok_or_else(|| JsValue::from_str("no timer text"))?;
    let prompt = el(
        doc,
        "h1",
        "vf-prompt",
        "font-size:22px; color:#333; margin:6px 0 4px; min-height:56px;",
    )?;
    let buttons_area = el(
        doc,
        "div",
        "vf-buttons",
        "position:relative; width:460px; height:240px; margin:14px auto 6px;",
    )?;
    let no_button = el(doc, "button", "vf-no", NO_BUTTON_STYLE)?;
    no_button.set_text_content(Some("No"));
    let yes_button = el(doc, "button", "vf-yes", "")?;
    yes_button.set_text_content(Some("Yes"));
    buttons_area.append_child(&no_button)?;
    buttons_area.append_child(&yes_button)?;
    let fail_caption = el(
        doc,
        "p",
        "vf-caption",
        "color:#b86; font-style:italic; margin:4px 0 0; font-size:14px;",
    )?;
    active.append_child(&timer)?;
    active.append_child(&prompt)?;
    active.append_child(&buttons_area)?;
    active.append_child(&fail_caption)?;
    root.append_child(&active)?;

    // Success card.
    let success = el(doc, "div", "vf-success", CARD_STYLE)?;
    success.set_inner_html(
        "<h2 style='color:#c2335e; margin:0 0 10px;'>💕 Yes! You made the right choice! 💕</h2>\
         <p style='color:#888; margin:0;'>Restarting in a moment...</p>",
    );
    root.append_child(&success)?;

    // Final failure card.
    let ending = el(doc, "div", "vf-ending", CARD_STYLE)?;
    ending.set_inner_html(
        "<h2 style='color:#555; margin:0 0 12px;'>Go ask LeBron to be your Valentine then 😞</h2>\
         <img src='assets/lebron.jpg' alt='LeBron' style='max-width:220px; border-radius:12px;'/>\
         <p style='font-size:32px; margin:10px 0;'>😭</p>",
    );
    let restart = el(
        doc,
        "button",
        "vf-restart",
        "padding:12px 28px; border:none; border-radius:10px; background:#e8557e; color:#fff; font-size:17px; cursor:pointer;",
    )?;
    restart.set_text_content(Some("Try Again"));
    ending.append_child(&restart)?;
    root.append_child(&ending)?;

    Ok(Dom {
        root,
        intro,
        active,
        success,
        ending,
        timer_text,
        timer_ring,
        prompt,
        fail_caption,
        buttons_area,
        yes_button,
    })
}

fn set_shown(element: &Element, base: &str, shown: bool) {
    let display = if shown { "block" } else { "none" };
    element
        .set_attribute("style", &format!("{base} display:{display};"))
        .ok();
}

/// Style string for the evading control. Activation is additionally gated in
/// `on_affirmative_click`; pointer-events here only shapes hover behavior.
fn affirmative_style(state: &FlowState, tag: EvasionTag) -> String {
    use evasion::{CONTROL_H, CONTROL_W};
    let base = format!(
        "position:absolute; width:{CONTROL_W}px; height:{CONTROL_H}px; border:none; border-radius:10px; background:#e8557e; color:#fff; font-size:17px; cursor:pointer;"
    );
    let pose = state.pose;
    let at = format!("left:{}px; top:{}px;", pose.x, pose.y);
    match tag {
        EvasionTag::Neutral => format!("{base} left:330px; top:95px;"),
        EvasionTag::Teleport => format!("{base} {at}"),
        EvasionTag::ShrinkAndWander => format!(
            "{base} {at} transform:scale({}); transition:all 0.3s ease; pointer-events:none;",
            pose.scale.unwrap_or(1.0)
        ),
        EvasionTag::Flicker => {
            let (opacity, events) = if state.flicker_visible {
                (1.0, "auto")
            } else {
                (0.0, "none")
            };
            format!("{base} {at} opacity:{opacity}; pointer-events:{events}; transition:opacity 0.3s ease;")
        }
        EvasionTag::Flee => format!("{base} {at} transition:all 0.3s ease; pointer-events:none;"),
        EvasionTag::FadeOnApproach => {
            let opacity = pose.opacity.unwrap_or(1.0);
            let events = if opacity < 0.5 { "none" } else { "auto" };
            format!("{base} {at} opacity:{opacity}; pointer-events:{events};")
        }
    }
}

/// Pure projection of `FlowState` onto the DOM: exactly one view is shown.
fn render(app: &FlowApp) {
    let dom = &app.dom;
    set_shown(&dom.intro, INTRO_STYLE, app.state.view == View::Intro);
    set_shown(
        &dom.active,
        CARD_STYLE,
        matches!(app.state.view, View::Active { .. }),
    );
    set_shown(&dom.success, CARD_STYLE, app.state.view == View::Success);
    set_shown(&dom.ending, CARD_STYLE, app.state.view == View::FinalFailure);

    if let View::Active { step } = app.state.view {
        let desc = &STEPS[step];
        dom.timer_text
            .set_text_content(Some(&format!("{}s", app.state.time_left)));
        dom.timer_ring
            .set_attribute(
                "stroke-dashoffset",
                &ring_dashoffset(app.state.time_left).to_string(),
            )
            .ok();
        dom.prompt.set_text_content(Some(desc.prompt));
        dom.fail_caption.set_text_content(Some(desc.fail_caption));
        dom.yes_button
            .set_attribute("style", &affirmative_style(&app.state, desc.evasion))
            .ok();
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_render_loop(alive: Rc<Cell<bool>>) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        // `alive` belongs to the mount this loop was started for. A frame
        // queued before teardown still fires after a remount swapped the app
        // cell, so the cell being occupied is not enough to keep going.
        if !alive.get() {
            return;
        }
        FLOW.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                render(app);
            }
        });
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
