mod dom;

use std::rc::Rc;

use gloo_net::http::Request;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, Element, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::ui::{
    anim::{CountUp, Typewriter},
    contact::{ContactForm, ContactMessage, Field, RelayReply, SubmitOutcome, SUCCESS_NOTICE_DURATION},
    projects::{project, visible_projects, ProjectCategory, ProjectId},
    scroll::{self, ScrollView},
    state::{persist_effects, Effect, Transition, UiState},
    viewport::{reveal_bar, BAR_RESTORE_DELAY},
};
use crate::visit::{log_visit, VisitOutcome};
use dom::LocalStore;

const CONTACT_PATH: &str = "/api/contact";

const NAV_LINKS: [(&str, &str); 5] = [
    ("home", "Home"),
    ("about", "About"),
    ("skills", "Skills"),
    ("projects", "Projects"),
    ("contact", "Contact"),
];

const STATS: [(&str, &str); 3] = [
    ("15+", "Projects Built"),
    ("2500+", "Commits Pushed"),
    ("3", "Certifications"),
];

struct SkillGroup {
    id: &'static str,
    title: &'static str,
    skills: &'static [(&'static str, u8)],
}

const SKILL_GROUPS: [SkillGroup; 3] = [
    SkillGroup {
        id: "skills-languages",
        title: "Languages",
        skills: &[("Python", 90), ("Bash", 80), ("JavaScript", 65)],
    },
    SkillGroup {
        id: "skills-systems",
        title: "Systems",
        skills: &[("Linux", 85), ("Networking", 70), ("Git", 80)],
    },
    SkillGroup {
        id: "skills-security",
        title: "Security",
        skills: &[("Nmap", 75), ("Wireshark", 65), ("Burp Suite", 55)],
    },
];

enum UiAction {
    ToggleTheme,
    ToggleMenu,
    CloseMenu,
    SetFilter(String),
    OpenModal(String),
    CloseModal(String),
    CloseModalBackdrop,
    ShowPrivacyNotice,
    ShowPrivacyDetails,
    ClosePrivacyDetails,
    AcceptPrivacy,
    BackToTop,
}

/// UI state plus the effects of the transition that produced it.
///
/// `revision` changes on every dispatch so the effect hook runs each batch
/// exactly once.
#[derive(Clone, PartialEq)]
struct Page {
    ui: UiState,
    effects: Rc<Vec<Effect>>,
    revision: u64,
}

impl Page {
    fn restore() -> Self {
        let transition = UiState::restore(&LocalStore, dom::system_prefers_dark());
        Self {
            ui: transition.state,
            effects: Rc::new(transition.effects),
            revision: 0,
        }
    }
}

impl Reducible for Page {
    type Action = UiAction;

    fn reduce(self: Rc<Self>, action: UiAction) -> Rc<Self> {
        let ui = &self.ui;
        let Transition { state, effects } = match action {
            UiAction::ToggleTheme => ui.toggle_theme(),
            UiAction::ToggleMenu => ui.toggle_menu(),
            UiAction::CloseMenu => ui.close_menu(),
            UiAction::SetFilter(category) => ui.set_filter(&category),
            UiAction::OpenModal(id) => ui.open_modal(&id),
            UiAction::CloseModal(id) => ui.close_modal(&id),
            UiAction::CloseModalBackdrop => ui.close_modal_backdrop(),
            UiAction::ShowPrivacyNotice => ui.show_privacy_notice(),
            UiAction::ShowPrivacyDetails => ui.show_privacy_details(),
            UiAction::ClosePrivacyDetails => ui.close_privacy_details(),
            UiAction::AcceptPrivacy => ui.accept_privacy(),
            UiAction::BackToTop => ui.back_to_top(),
        };

        Rc::new(Self {
            ui: state,
            effects: Rc::new(effects),
            revision: self.revision + 1,
        })
    }
}

fn run_effects(page: &Page, dispatcher: UseReducerDispatcher<Page>) {
    let mut store = LocalStore;
    for effect in persist_effects(&mut store, &page.effects) {
        match effect {
            Effect::ApplyTheme(theme) if page.revision == 0 => dom::apply_theme(*theme),
            Effect::ApplyTheme(theme) => dom::apply_theme_with_transition(*theme),
            Effect::ScheduleNotice(delay) => {
                let dispatcher = dispatcher.clone();
                dom::set_timeout(*delay, move || dispatcher.dispatch(UiAction::ShowPrivacyNotice));
            }
            Effect::LogVisit => {
                let consent = page.ui.consent_given();
                spawn_local(async move {
                    let mut store = LocalStore;
                    let outcome =
                        log_visit(&dom::WebVisitTransport, &mut store, consent, dom::page_context()).await;
                    match outcome {
                        VisitOutcome::Abandoned(reason) => {
                            dom::console_log(&format!("IP logging error: {reason}"))
                        }
                        VisitOutcome::StoredFallback(_) => {
                            dom::console_log("visitor log unavailable, stored locally")
                        }
                        VisitOutcome::Logged(_) | VisitOutcome::NoConsent => {}
                    }
                });
            }
            Effect::ScrollToTop => dom::scroll_to_top(),
            Effect::Persist { .. } => {}
        }
    }
}

#[function_component(Typing)]
fn typing() -> Html {
    let text = use_state(String::new);

    {
        let text = text.clone();
        use_effect_with((), move |_| {
            if let Some(typewriter) = Typewriter::hero() {
                dom::run_animation(typewriter, move |frame| text.set(frame));
            }
            || ()
        });
    }

    html! {
        <span class="typing-text">{(*text).clone()}</span>
    }
}

#[derive(Properties, PartialEq)]
struct StatProps {
    value: AttrValue,
    label: AttrValue,
    started: bool,
}

#[function_component(Stat)]
fn stat(props: &StatProps) -> Html {
    let shown = use_state(|| props.value.to_string());

    {
        let shown = shown.clone();
        let value = props.value.clone();
        use_effect_with(props.started, move |started| {
            if *started {
                if let Some(count_up) = CountUp::parse(&value) {
                    dom::run_animation(count_up, move |frame| shown.set(frame));
                }
            }
            || ()
        });
    }

    html! {
        <div class="stat">
            <span class={classes!("stat-number", props.started.then_some("animated"))}>{(*shown).clone()}</span>
            <span class="stat-label">{props.label.clone()}</span>
        </div>
    }
}

#[function_component(Stats)]
fn stats() -> Html {
    let grid = use_node_ref();
    let started = use_state(|| false);

    {
        let grid = grid.clone();
        let started = started.clone();
        use_effect_with((), move |_| {
            if let Some(element) = grid.cast::<Element>() {
                dom::observe_once(vec![element], move |_| started.set(true));
            }
            || ()
        });
    }

    html! {
        <div id="stats" class="stats-grid" ref={grid}>
            { for STATS.iter().map(|(value, label)| html! {
                <Stat value={*value} label={*label} started={*started} />
            }) }
        </div>
    }
}

#[derive(Clone, Copy, PartialEq)]
enum BarPhase {
    Resting,
    Collapsed,
    Expanded,
}

#[derive(Properties, PartialEq)]
struct SkillCategoryProps {
    index: usize,
}

#[function_component(SkillCategory)]
fn skill_category(props: &SkillCategoryProps) -> Html {
    let group = &SKILL_GROUPS[props.index];
    let node = use_node_ref();
    let phase = use_state(|| BarPhase::Resting);

    {
        let node = node.clone();
        let phase = phase.clone();
        use_effect_with((), move |_| {
            if let Some(element) = node.cast::<Element>() {
                dom::observe_once(vec![element], move |_| {
                    phase.set(BarPhase::Collapsed);
                    let phase = phase.clone();
                    dom::set_timeout(BAR_RESTORE_DELAY, move || {
                        phase.set(BarPhase::Expanded)
                    });
                });
            }
            || ()
        });
    }

    html! {
        <div id={group.id} class="skill-category" ref={node}>
            <h3>{group.title}</h3>
            { for group.skills.iter().map(|(name, level)| {
                let reveal = reveal_bar(*level);
                let width = match *phase {
                    BarPhase::Collapsed => reveal.initial_width.to_string(),
                    BarPhase::Resting | BarPhase::Expanded => reveal.target_width.clone(),
                };
                html! {
                    <div class="skill">
                        <div class="skill-info">
                            <span>{*name}</span>
                            <span>{reveal.target_width.clone()}</span>
                        </div>
                        <div class="skill-bar">
                            <div
                                class={classes!("skill-progress", (*phase != BarPhase::Resting).then_some("animated"))}
                                style={format!("width: {width};")}
                            />
                        </div>
                    </div>
                }
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ProjectsProps {
    filter: ProjectCategory,
    open_modal: Option<ProjectId>,
    dispatcher: UseReducerDispatcher<Page>,
}

#[function_component(Projects)]
fn projects(props: &ProjectsProps) -> Html {
    let filters = ProjectCategory::ALL.iter().map(|category| {
        let dispatcher = props.dispatcher.clone();
        let name = category.as_str();
        let onclick = Callback::from(move |_| dispatcher.dispatch(UiAction::SetFilter(name.to_string())));
        html! {
            <button
                type="button"
                class={classes!("filter-btn", (*category == props.filter).then_some("active"))}
                {onclick}
            >
                {category.label()}
            </button>
        }
    });

    let cards = visible_projects(props.filter).map(|item| {
        let dispatcher = props.dispatcher.clone();
        let id = item.id.as_str();
        let onclick = Callback::from(move |_| dispatcher.dispatch(UiAction::OpenModal(id.to_string())));
        html! {
            <article class="project-card" data-category={item.category.as_str()}>
                <h3>{item.title}</h3>
                <p>{item.summary}</p>
                <ul class="tech-list">
                    { for item.stack.iter().map(|tech| html! { <li>{*tech}</li> }) }
                </ul>
                <button type="button" class="project-details" {onclick}>{"Details"}</button>
            </article>
        }
    });

    let modal = props.open_modal.map(|id| {
        let item = project(id);
        let close = {
            let dispatcher = props.dispatcher.clone();
            Callback::from(move |_| dispatcher.dispatch(UiAction::CloseModal(id.as_str().to_string())))
        };
        let backdrop = {
            let dispatcher = props.dispatcher.clone();
            Callback::from(move |_| dispatcher.dispatch(UiAction::CloseModalBackdrop))
        };
        let keep_open = Callback::from(|event: MouseEvent| event.stop_propagation());

        html! {
            <div id={id.modal_element_id()} class="modal" style="display: block;" onclick={backdrop}>
                <div class="modal-content" onclick={keep_open}>
                    <button type="button" class="modal-close" aria-label="Close" onclick={close}>{"×"}</button>
                    <h2>{item.title}</h2>
                    <p>{item.details}</p>
                    <ul class="tech-list">
                        { for item.stack.iter().map(|tech| html! { <li>{*tech}</li> }) }
                    </ul>
                </div>
            </div>
        }
    });

    html! {
        <section id="projects" class="section">
            <h2 class="section-title">{"Projects"}</h2>
            <div class="project-filters">{ for filters }</div>
            <div class="projects-grid">{ for cards }</div>
            { for modal }
        </section>
    }
}

enum FormAction {
    Set(Field, String),
    Submit,
    Finish(SubmitOutcome),
    ClearNotice,
}

impl Reducible for ContactForm {
    type Action = FormAction;

    fn reduce(self: Rc<Self>, action: FormAction) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            FormAction::Set(field, value) => next.set(field, value),
            FormAction::Submit => {
                next.submit();
            }
            FormAction::Finish(outcome) => next.finish(outcome),
            FormAction::ClearNotice => next.clear_notice(),
        }
        Rc::new(next)
    }
}

async fn post_contact(message: &ContactMessage) -> SubmitOutcome {
    let Ok(request) = Request::post(CONTACT_PATH).json(message) else {
        return SubmitOutcome::Network;
    };

    let response = match request.send().await {
        Ok(response) => response,
        Err(error) => {
            dom::console_log(&format!("Error: {error}"));
            return SubmitOutcome::Network;
        }
    };

    match response.json::<RelayReply>().await {
        Ok(reply) => reply.into(),
        Err(error) => {
            dom::console_log(&format!("Error: {error}"));
            SubmitOutcome::Network
        }
    }
}

#[function_component(Contact)]
fn contact() -> Html {
    let form = use_reducer(ContactForm::default);

    let on_input = |field: Field| {
        let form = form.dispatcher();
        Callback::from(move |event: InputEvent| {
            let value = event
                .target_dyn_into::<HtmlInputElement>()
                .map(|input| input.value())
                .or_else(|| {
                    event
                        .target_dyn_into::<HtmlTextAreaElement>()
                        .map(|area| area.value())
                })
                .unwrap_or_default();
            form.dispatch(FormAction::Set(field, value));
        })
    };

    let onsubmit = {
        let form = form.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            let mut draft = (*form).clone();
            let message = draft.submit();
            form.dispatch(FormAction::Submit);

            let Some(message) = message else {
                return;
            };

            let dispatcher = form.dispatcher();
            spawn_local(async move {
                let outcome = post_contact(&message).await;
                let sent = matches!(outcome, SubmitOutcome::Sent);
                dispatcher.dispatch(FormAction::Finish(outcome));

                if sent {
                    dom::set_timeout(SUCCESS_NOTICE_DURATION, move || {
                        dispatcher.dispatch(FormAction::ClearNotice)
                    });
                }
            });
        })
    };

    let notice = form.notice();

    html! {
        <section id="contact" class="section">
            <h2 class="section-title">{"Get In Touch"}</h2>
            <form id="contactForm" class="contact-form" {onsubmit} novalidate=true>
                <input id="name" type="text" placeholder="Your Name" value={form.fields.name.clone()} oninput={on_input(Field::Name)} />
                <input id="email" type="email" placeholder="Your Email" value={form.fields.email.clone()} oninput={on_input(Field::Email)} />
                <input id="subject" type="text" placeholder="Subject" value={form.fields.subject.clone()} oninput={on_input(Field::Subject)} />
                <textarea id="message" rows="5" placeholder="Your Message" value={form.fields.message.clone()} oninput={on_input(Field::Message)} />
                <button type="submit" class="form-submit" disabled={form.is_sending()}>{form.button_label()}</button>
                <p id="formMessage" class={classes!("form-message", notice.as_ref().map(|(class, _)| *class))}>
                    {notice.map(|(_, text)| text).unwrap_or_default()}
                </p>
            </form>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct PrivacyProps {
    ui: UiState,
    dispatcher: UseReducerDispatcher<Page>,
}

#[function_component(Privacy)]
fn privacy(props: &PrivacyProps) -> Html {
    let dispatch = |action: fn() -> UiAction| {
        let dispatcher = props.dispatcher.clone();
        Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            dispatcher.dispatch(action());
        })
    };

    html! {
        <>
            if props.ui.notice_visible() {
                <div id="privacyPolicyPopup" class="privacy-popup show" style="display: flex;">
                    <p>
                        {"This site logs your IP address for basic visitor analytics. "}
                        <a href="#" onclick={dispatch(|| UiAction::ShowPrivacyDetails)}>{"Read the privacy policy"}</a>
                    </p>
                    <button type="button" class="privacy-accept" onclick={dispatch(|| UiAction::AcceptPrivacy)}>{"Accept"}</button>
                </div>
            }
            if props.ui.privacy_details_open {
                <div id="privacyPolicyModal" class="modal show" style="display: block;">
                    <div class="modal-content">
                        <button type="button" class="modal-close" aria-label="Close" onclick={dispatch(|| UiAction::ClosePrivacyDetails)}>{"×"}</button>
                        <h2>{"Privacy Policy"}</h2>
                        <p>{"After you accept, your public IP address, the visit time, page URL and browser user agent are sent once to this site's server log. Nothing is stored in a database."}</p>
                        <button type="button" class="privacy-accept" onclick={dispatch(|| UiAction::AcceptPrivacy)}>{"Accept"}</button>
                    </div>
                </div>
            }
        </>
    }
}

#[function_component(App)]
fn app() -> Html {
    let page = use_reducer(Page::restore);
    let scroll_view = use_state(ScrollView::default);

    {
        let dispatcher = page.dispatcher();
        let snapshot = (*page).clone();
        use_effect_with(page.revision, move |_| {
            run_effects(&snapshot, dispatcher);
            || ()
        });
    }

    {
        let scroll_view = scroll_view.clone();
        use_effect_with((), move |_| {
            let update = move |_: web_sys::Event| scroll_view.set(scroll::compute(&dom::read_scroll_metrics()));
            let on_scroll = dom::window_target().and_then(|target| dom::listen(target, "scroll", update.clone()));
            let on_resize = dom::window_target().and_then(|target| dom::listen(target, "resize", update));
            move || {
                drop(on_scroll);
                drop(on_resize);
            }
        });
    }

    {
        let dispatcher = page.dispatcher();
        use_effect_with((), move |_| {
            let on_click = dom::document_target().and_then(|target| {
                dom::listen(target, "click", move |event| {
                    if !dom::event_inside(&event, "nav") {
                        dispatcher.dispatch(UiAction::CloseMenu);
                    }
                })
            });
            move || drop(on_click)
        });
    }

    let ui = &page.ui;
    let on_theme = {
        let dispatcher = page.dispatcher();
        Callback::from(move |_| dispatcher.dispatch(UiAction::ToggleTheme))
    };
    let on_hamburger = {
        let dispatcher = page.dispatcher();
        Callback::from(move |_| dispatcher.dispatch(UiAction::ToggleMenu))
    };
    let on_back_to_top = {
        let dispatcher = page.dispatcher();
        Callback::from(move |_| dispatcher.dispatch(UiAction::BackToTop))
    };

    let links = NAV_LINKS.iter().map(|(target, label)| {
        let dispatcher = page.dispatcher();
        let onclick = Callback::from(move |_| dispatcher.dispatch(UiAction::CloseMenu));
        html! {
            <li>
                <a
                    href={format!("#{target}")}
                    class={classes!("nav-link", scroll_view.is_link_active(target).then_some("active"))}
                    {onclick}
                >
                    {*label}
                </a>
            </li>
        }
    });

    html! {
        <>
            <div class="scroll-progress" style={scroll_view.progress_style()} />
            <nav class="navbar">
                <a class="logo" href="#home">{"Ritusmin"}</a>
                <ul id="navMenu" class={classes!("nav-menu", ui.menu_open.then_some("active"))}>
                    { for links }
                </ul>
                <button
                    id="themeToggle"
                    class="theme-toggle"
                    type="button"
                    aria-label={ui.theme.toggle_label()}
                    aria-pressed={ui.theme.pressed().to_string()}
                    onclick={on_theme}
                >
                    <span aria-hidden="true">{ui.theme.icon()}</span>
                </button>
                <button
                    id="hamburger"
                    class={classes!("hamburger", ui.menu_open.then_some("active"))}
                    type="button"
                    aria-label="Toggle navigation"
                    aria-expanded={ui.menu_open.to_string()}
                    onclick={on_hamburger}
                >
                    <span /><span /><span />
                </button>
            </nav>

            <main>
                <section id="home" class="hero">
                    <h1>{"Hi, I'm Ritusmin"}</h1>
                    <p class="hero-subtitle">{"I'm a "}<Typing /></p>
                </section>

                <section id="about" class="section">
                    <h2 class="section-title">{"About Me"}</h2>
                    <p>{"I build small tools for Linux and security work, mostly in Python, and write about what I learn along the way."}</p>
                    <Stats />
                </section>

                <section id="skills" class="section">
                    <h2 class="section-title">{"Skills"}</h2>
                    <div class="skills-grid">
                        { for (0..SKILL_GROUPS.len()).map(|index| html! { <SkillCategory {index} /> }) }
                    </div>
                </section>

                <Projects filter={ui.active_filter} open_modal={ui.open_modal} dispatcher={page.dispatcher()} />
                <Contact />
            </main>

            <footer class="footer">
                <p>{"© Ritusmin. Built with Rust and WebAssembly."}</p>
            </footer>

            <button
                id="backToTop"
                type="button"
                class={classes!("back-to-top", scroll_view.back_to_top_visible.then_some("show"))}
                aria-label="Back to top"
                onclick={on_back_to_top}
            >
                {"↑"}
            </button>

            <Privacy ui={ui.clone()} dispatcher={page.dispatcher()} />
        </>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
