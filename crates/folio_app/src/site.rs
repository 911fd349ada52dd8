//! Whole-page driver
//!
//! [`Site`] lays out the portfolio's animated sections in a page's
//! document, mounts their controllers in order, and forwards scroll,
//! resize and frame events. The intro mounts first so the checkpoints it
//! places exist by the time the other sections look for them.

use crate::config::FolioConfig;
use crate::content::SiteContent;
use crate::controller::{ControllerPhase, SectionController};
use crate::error::Result;
use crate::page::{current_page, install_page, uninstall_page, Page};
use crate::sections::{
    AboutChoreography, HeroChoreography, IntroChoreography, NavigationChoreography,
    SkillsChoreography,
};
use crate::showcase::{ShowcaseView, SkillsShowcase};
use folio_core::dom::{Document, ElementId, ElementSpec, Rect};
use std::rc::Rc;

const NAV_HEIGHT: f32 = 64.0;
const SECTION_GAP: f32 = 100.0;
const ABOUT_HEIGHT: f32 = 900.0;
const SKILL_ROW_HEIGHT: f32 = 60.0;
const CURTAIN_PANELS: usize = 3;
const NAV_LINKS: [&str; 4] = ["about", "projects", "skills", "contact"];
const ABOUT_PARAGRAPHS: usize = 2;

/// Root elements of each section
#[derive(Clone, Copy, Debug)]
pub struct SiteLayout {
    pub intro: ElementId,
    pub navigation: ElementId,
    pub hero: ElementId,
    pub about: ElementId,
    pub skills: ElementId,
    pub showcase: ElementId,
}

impl SiteLayout {
    /// Build the section markup into `document`
    pub fn build(
        document: &Document,
        width: f32,
        height: f32,
        content: &SiteContent,
    ) -> Result<Self> {
        let body = document.body();
        let el = |parent: ElementId, spec: ElementSpec| document.append(parent, spec);

        let intro = el(
            body,
            ElementSpec::new("section").id("intro").rect(Rect::new(0.0, 0.0, width, height)),
        )?;
        el(
            intro,
            ElementSpec::new("h2")
                .class("intro-text")
                .rect(Rect::new(width / 2.0 - 200.0, height / 2.0 - 20.0, 400.0, 40.0)),
        )?;
        let panel_width = width / CURTAIN_PANELS as f32;
        for i in 0..CURTAIN_PANELS {
            el(
                intro,
                ElementSpec::new("div")
                    .class("curtain-panel")
                    .rect(Rect::new(i as f32 * panel_width, 0.0, panel_width, height)),
            )?;
        }

        let nav_rect = Rect::new(0.0, 0.0, width, NAV_HEIGHT);
        let navigation = el(body, ElementSpec::new("nav").id("navigation").rect(nav_rect))?;
        el(navigation, ElementSpec::new("div").class("nav-backdrop").rect(nav_rect))?;
        let bar = el(navigation, ElementSpec::new("div").class("nav-bar").rect(nav_rect))?;
        for (i, name) in NAV_LINKS.iter().enumerate() {
            el(
                bar,
                ElementSpec::new("a")
                    .id(format!("nav-{name}"))
                    .class("nav-link")
                    .rect(Rect::new(width - 480.0 + i as f32 * 110.0, 20.0, 100.0, 24.0)),
            )?;
        }

        let hero = el(
            body,
            ElementSpec::new("section").id("hero").rect(Rect::new(0.0, 0.0, width, height)),
        )?;
        for (class, tag, y, h) in [
            ("hero-title", "h1", 0.30, 0.12),
            ("hero-subtitle", "p", 0.44, 0.06),
            ("hero-cta", "a", 0.55, 0.06),
            ("hero-visual", "canvas", 0.20, 0.60),
        ] {
            el(
                hero,
                ElementSpec::new(tag)
                    .class(class)
                    .rect(Rect::new(width * 0.1, height * y, width * 0.4, height * h)),
            )?;
        }

        let about_top = height + SECTION_GAP;
        let about = el(
            body,
            ElementSpec::new("section")
                .id("about")
                .rect(Rect::new(0.0, about_top, width, ABOUT_HEIGHT)),
        )?;
        el(
            about,
            ElementSpec::new("h2")
                .class("about-heading")
                .rect(Rect::new(80.0, about_top + 80.0, 600.0, 60.0)),
        )?;
        el(
            about,
            ElementSpec::new("svg")
                .class("about-divider")
                .rect(Rect::new(80.0, about_top + 160.0, 400.0, 2.0)),
        )?;
        for i in 0..ABOUT_PARAGRAPHS {
            el(
                about,
                ElementSpec::new("p")
                    .class("about-paragraph")
                    .rect(Rect::new(80.0, about_top + 200.0 + i as f32 * 120.0, 700.0, 100.0)),
            )?;
        }
        for i in 0..content.stats.len() {
            el(
                about,
                ElementSpec::new("span")
                    .class("stat-value")
                    .rect(Rect::new(80.0 + i as f32 * 220.0, about_top + 600.0, 200.0, 80.0)),
            )?;
        }

        let skills_top = about_top + ABOUT_HEIGHT + SECTION_GAP;
        let rows = content.skills.len() as f32 * SKILL_ROW_HEIGHT;
        let skills = el(
            body,
            ElementSpec::new("section")
                .id("skills")
                .rect(Rect::new(0.0, skills_top, width, 200.0 + rows.max(400.0))),
        )?;
        for i in 0..content.skills.len() {
            let y = skills_top + 120.0 + i as f32 * SKILL_ROW_HEIGHT;
            el(
                skills,
                ElementSpec::new("span")
                    .class("skill-label")
                    .rect(Rect::new(80.0, y, 200.0, 20.0)),
            )?;
            el(
                skills,
                ElementSpec::new("div")
                    .class("skill-bar")
                    .rect(Rect::new(80.0, y + 24.0, 400.0, 12.0)),
            )?;
        }
        let showcase = el(
            skills,
            ElementSpec::new("div")
                .id("showcase")
                .rect(Rect::new(width * 0.5, skills_top + 100.0, width * 0.4, 400.0)),
        )?;

        Ok(Self {
            intro,
            navigation,
            hero,
            about,
            skills,
            showcase,
        })
    }
}

/// The animated portfolio page
pub struct Site {
    page: Page,
    content: Rc<SiteContent>,
    layout: SiteLayout,
    intro: SectionController<IntroChoreography>,
    navigation: SectionController<NavigationChoreography>,
    hero: SectionController<HeroChoreography>,
    about: SectionController<AboutChoreography>,
    skills: SectionController<SkillsChoreography>,
    showcase: SkillsShowcase,
    showcase_view: ShowcaseView,
}

impl Site {
    pub fn new(page: Page, config: &FolioConfig, content: SiteContent) -> Result<Self> {
        let viewport = page.viewport();
        let layout = SiteLayout::build(page.document(), viewport.width, viewport.height, &content)?;
        let content = Rc::new(content);
        let intro = IntroChoreography::from_config(config)?;
        let navigation = NavigationChoreography::from_config(config)?;
        let hero = HeroChoreography::from_config(config)?;
        let about = AboutChoreography::from_config(config)?;
        let skills = SkillsChoreography::from_config(config)?;

        Ok(Self {
            intro: SectionController::new(intro, Rc::clone(&content)),
            navigation: SectionController::new(navigation, Rc::clone(&content)),
            hero: SectionController::new(hero, Rc::clone(&content)),
            about: SectionController::new(about, Rc::clone(&content)),
            skills: SectionController::new(skills, Rc::clone(&content)),
            showcase: SkillsShowcase::new(config.capability_policy()),
            showcase_view: ShowcaseView::Placeholder,
            page,
            content,
            layout,
        })
    }

    /// Install the page and mount every section
    pub fn mount(&mut self) {
        install_page(self.page.clone());
        let page = &self.page;

        self.intro.mount(page, Some(self.layout.intro));
        self.navigation.mount(page, Some(self.layout.navigation));
        self.hero.mount(page, Some(self.layout.hero));
        self.about.mount(page, Some(self.layout.about));
        self.skills.mount(page, Some(self.layout.skills));
        self.showcase_view = self.showcase.mount(page.env(), &self.content);

        tracing::info!(
            intro = ?self.intro.phase(),
            hero = ?self.hero.phase(),
            showcase = %self.showcase.decision(),
            "site mounted"
        );
    }

    fn update(&mut self) {
        let page = &self.page;
        self.intro.update(page);
        self.navigation.update(page);
        self.hero.update(page);
        self.about.update(page);
        self.skills.update(page);
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.page.scroll_to(y);
        self.update();
    }

    /// Resize the viewport; the showcase keeps its strategy
    pub fn resize(&mut self, width: f32, height: f32) {
        self.page.resize(width, height);
        self.update();
        if self.showcase.decision().is_resolved() {
            self.showcase_view = self.showcase.mount(self.page.env(), &self.content);
        }
    }

    pub fn frame(&mut self, dt_ms: f32) -> bool {
        self.page.frame(dt_ms)
    }

    /// Unmount every section and uninstall the page
    pub fn unmount(&mut self) {
        let page = &self.page;
        self.skills.unmount(page);
        self.about.unmount(page);
        self.hero.unmount(page);
        self.navigation.unmount(page);
        self.intro.unmount(page);
        self.showcase_view = ShowcaseView::Placeholder;

        if current_page().is_some_and(|p| p.ptr_eq(page)) {
            uninstall_page();
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn content(&self) -> &SiteContent {
        &self.content
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    pub fn intro(&self) -> &SectionController<IntroChoreography> {
        &self.intro
    }

    pub fn navigation(&self) -> &SectionController<NavigationChoreography> {
        &self.navigation
    }

    pub fn hero(&self) -> &SectionController<HeroChoreography> {
        &self.hero
    }

    pub fn about(&self) -> &SectionController<AboutChoreography> {
        &self.about
    }

    pub fn skills(&self) -> &SectionController<SkillsChoreography> {
        &self.skills
    }

    pub fn showcase(&self) -> &SkillsShowcase {
        &self.showcase
    }

    pub fn showcase_view(&self) -> &ShowcaseView {
        &self.showcase_view
    }

    /// Phase of every section, in mount order
    pub fn phases(&self) -> [(&'static str, ControllerPhase); 5] {
        [
            ("intro", self.intro.phase()),
            ("navigation", self.navigation.phase()),
            ("hero", self.hero.phase()),
            ("about", self.about.phase()),
            ("skills", self.skills.phase()),
        ]
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        self.unmount();
    }
}
