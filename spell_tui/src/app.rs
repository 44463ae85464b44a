//! Application state

use crate::slider;
use crate::ui;
use ratatui::layout::{Position, Rect};
use spell_core::codex::Codex;
use spell_core::config::ForgeConfig;
use spell_core::grimoire::{GrimoireQuery, ManifestedSpell, SpellDraft};
use spell_core::invocation::InvocationState;
use spell_core::{MagicSystem, Session, SessionError};

/// HP step for key nudges on the slider
const HP_STEP: i64 = 5;
/// Battle focus step for key nudges
const FOCUS_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Forge,
    Grimoire,
    Codex,
    Battle,
    Import,
    Help,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Forge, Tab::Grimoire, Tab::Codex, Tab::Battle, Tab::Import, Tab::Help]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Forge => "Forge",
            Tab::Grimoire => "Grimoire",
            Tab::Codex => "Codex",
            Tab::Battle => "Battle",
            Tab::Import => "Import",
            Tab::Help => "Help",
        }
    }
}

/// Forge parameter under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeField {
    Character,
    System,
    Attribute,
    Rank,
    Activity,
    Hp,
    Protection,
    Tool,
    Reinforcement,
    Buff,
}

impl ForgeField {
    pub fn all() -> &'static [ForgeField] {
        &[
            ForgeField::Character,
            ForgeField::System,
            ForgeField::Attribute,
            ForgeField::Rank,
            ForgeField::Activity,
            ForgeField::Hp,
            ForgeField::Protection,
            ForgeField::Tool,
            ForgeField::Reinforcement,
            ForgeField::Buff,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ForgeField::Character => "Persona",
            ForgeField::System => "System",
            ForgeField::Attribute => "Attribute",
            ForgeField::Rank => "Rank",
            ForgeField::Activity => "Activity",
            ForgeField::Hp => "HP",
            ForgeField::Protection => "Protection",
            ForgeField::Tool => "Tool",
            ForgeField::Reinforcement => "Reinforce",
            ForgeField::Buff => "Resonance",
        }
    }
}

/// Table shown in the codex tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodexSection {
    Attributes,
    Protections,
    Tools,
    Characters,
    Ranks,
    Enemies,
}

impl CodexSection {
    pub fn all() -> &'static [CodexSection] {
        &[
            CodexSection::Attributes,
            CodexSection::Protections,
            CodexSection::Tools,
            CodexSection::Characters,
            CodexSection::Ranks,
            CodexSection::Enemies,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CodexSection::Attributes => "Attributes",
            CodexSection::Protections => "Protections",
            CodexSection::Tools => "Tools",
            CodexSection::Characters => "Personas",
            CodexSection::Ranks => "Ranks",
            CodexSection::Enemies => "Enemies",
        }
    }
}

/// What a line of typed text will be used for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    CharacterName,
    DraftName,
    /// Rename the grimoire entry with this id
    RenameEntry(String),
    Search,
    ImportPath,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::CharacterName => "New persona name",
            PromptKind::DraftName => "Manual spell name",
            PromptKind::RenameEntry(_) => "Rename spell",
            PromptKind::Search => "Search grimoire",
            PromptKind::ImportPath => "JSON file to import",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

/// Step through `len` items from `current`, wrapping at both ends
fn cycle(current: Option<usize>, len: usize, dir: i8) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None => 0,
        Some(i) if dir < 0 => (i + len - 1) % len,
        Some(i) => (i + 1) % len,
    })
}

pub struct App {
    pub current_tab: Tab,
    pub session: Session,
    pub forge_field: ForgeField,
    pub trace_scroll: usize,
    // Grimoire UI state
    pub grimoire_query: GrimoireQuery,
    pub selected_entry: usize,
    // Codex UI state
    pub codex_section: CodexSection,
    pub codex_selected: usize,
    // Battle UI state
    pub log_scroll: usize,
    pub prompt: Option<Prompt>,
    pub status: String,
    pub import_history: Vec<String>,
    pub time_elapsed: f64,
}

impl App {
    pub fn new(session: Session) -> Self {
        App {
            current_tab: Tab::Forge,
            session,
            forge_field: ForgeField::System,
            trace_scroll: 0,
            grimoire_query: GrimoireQuery::default(),
            selected_entry: 0,
            codex_section: CodexSection::Attributes,
            codex_selected: 0,
            log_scroll: 0,
            prompt: None,
            status: "Forge ready. Select parameters and press Enter to cast.".to_string(),
            import_history: Vec::new(),
            time_elapsed: 0.0,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    /// Show an error in the status line; Ok values pass through
    fn report<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("ui action rejected: {}", e);
                self.set_status(format!("✗ {}", e));
                None
            }
        }
    }

    // === Tabs ===

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let current_idx = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.current_tab = tabs[(current_idx + 1) % tabs.len()];
    }

    pub fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let current_idx = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        let prev_idx = if current_idx == 0 {
            tabs.len() - 1
        } else {
            current_idx - 1
        };
        self.current_tab = tabs[prev_idx];
    }

    pub fn set_tab(&mut self, index: usize) {
        let tabs = Tab::all();
        if index < tabs.len() {
            self.current_tab = tabs[index];
        }
    }

    // === Navigation ===

    pub fn on_up(&mut self) {
        match self.current_tab {
            Tab::Forge => {
                let fields = ForgeField::all();
                let idx = fields.iter().position(|f| *f == self.forge_field).unwrap_or(0);
                if idx > 0 {
                    self.forge_field = fields[idx - 1];
                }
            }
            Tab::Grimoire => {
                self.selected_entry = self.selected_entry.saturating_sub(1);
            }
            Tab::Codex => {
                self.codex_selected = self.codex_selected.saturating_sub(1);
            }
            Tab::Battle => {
                self.log_scroll = self.log_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn on_down(&mut self) {
        match self.current_tab {
            Tab::Forge => {
                let fields = ForgeField::all();
                let idx = fields.iter().position(|f| *f == self.forge_field).unwrap_or(0);
                if idx + 1 < fields.len() {
                    self.forge_field = fields[idx + 1];
                }
            }
            Tab::Grimoire => {
                let len = self.visible_entries().len();
                if self.selected_entry + 1 < len {
                    self.selected_entry += 1;
                }
            }
            Tab::Codex => {
                if self.codex_selected + 1 < self.codex_len() {
                    self.codex_selected += 1;
                }
            }
            Tab::Battle => {
                self.log_scroll += 1;
            }
            _ => {}
        }
    }

    pub fn on_left(&mut self) {
        match self.current_tab {
            Tab::Forge => self.adjust_field(-1),
            Tab::Codex => self.cycle_codex_section(-1),
            Tab::Battle => self.adjust_focus(-FOCUS_STEP),
            _ => {}
        }
    }

    pub fn on_right(&mut self) {
        match self.current_tab {
            Tab::Forge => self.adjust_field(1),
            Tab::Codex => self.cycle_codex_section(1),
            Tab::Battle => self.adjust_focus(FOCUS_STEP),
            _ => {}
        }
    }

    pub fn on_enter(&mut self) {
        match self.current_tab {
            Tab::Forge => self.primary_action(),
            Tab::Grimoire => self.use_selected_entry(),
            Tab::Codex => self.apply_codex_selection(),
            Tab::Battle => self.battle_act(),
            Tab::Import => self.start_prompt(PromptKind::ImportPath),
            Tab::Help => {}
        }
    }

    pub fn on_space(&mut self) {
        match self.current_tab {
            Tab::Battle => self.battle_act(),
            _ => self.primary_action(),
        }
    }

    /// Mouse press or drag: drives the HP slider and the activity dial
    pub fn on_click(&mut self, column: u16, row: u16, frame: Rect) {
        if self.current_tab != Tab::Forge {
            return;
        }
        let regions = ui::forge_view::regions(ui::content_area(frame));
        let pointer = Position::new(column, row);

        let hp_track = ui::track(regions.hp_slider);
        if hp_track.contains(pointer) {
            let max_hp = self.session.caster().max_hp;
            self.session.set_hp(slider::hp_from_row(row, hp_track, max_hp));
            self.forge_field = ForgeField::Hp;
            return;
        }

        let dial = ui::track(regions.dial);
        if dial.contains(pointer) {
            if let Some(value) = slider::dial_value(column, row, dial) {
                self.session.set_activity_rate(value);
                self.forge_field = ForgeField::Activity;
            }
            return;
        }

        // The eye releases a manifested spell
        if regions.circle.contains(pointer) && matches!(self.session.state(), InvocationState::Ready) {
            self.primary_action();
        }
    }

    // === Forge ===

    /// Change the field under the cursor by one step in `dir`
    pub fn adjust_field(&mut self, dir: i8) {
        let selection = self.session.selection().clone();
        match self.forge_field {
            ForgeField::Character => {
                let characters = self.session.codex().characters();
                let current = selection
                    .character_id
                    .as_deref()
                    .and_then(|id| characters.iter().position(|c| c.id == id));
                if let Some(idx) = cycle(current, characters.len(), dir) {
                    let id = characters[idx].id.clone();
                    let result = self.session.apply_character(&id);
                    self.report(result);
                }
            }
            ForgeField::System => {
                let systems = MagicSystem::all();
                let current = systems.iter().position(|s| *s == selection.system);
                if let Some(idx) = cycle(current, systems.len(), dir) {
                    self.session.select_system(systems[idx]);
                }
            }
            ForgeField::Attribute => {
                let names: Vec<String> = self
                    .session
                    .codex()
                    .attributes_of(selection.system)
                    .iter()
                    .map(|a| a.name.clone())
                    .collect();
                let current = names.iter().position(|n| *n == selection.attribute);
                if let Some(idx) = cycle(current, names.len(), dir) {
                    let result = self.session.select_attribute(&names[idx]);
                    self.report(result);
                }
            }
            ForgeField::Rank => {
                let rank = if dir < 0 {
                    selection.rank.saturating_sub(1)
                } else {
                    selection.rank.saturating_add(1)
                };
                self.session.set_rank(rank);
                if self.session.selection().rank != rank && dir > 0 {
                    self.set_status(format!(
                        "Rank {} needs {:.0}% activity",
                        rank,
                        self.session.rank_requirement(rank)
                    ));
                }
            }
            ForgeField::Activity => {
                let rate = slider::nudge(selection.activity_rate, dir as f64, 0.0, 100.0);
                self.session.set_activity_rate(rate);
            }
            ForgeField::Hp => {
                let caster = self.session.caster();
                let hp = (caster.hp as i64 + HP_STEP * dir as i64).clamp(0, caster.max_hp as i64);
                self.session.set_hp(hp as u32);
            }
            ForgeField::Protection => {
                let protections = self.session.codex().protections();
                let current = protections.iter().position(|p| p.id == selection.protection_id);
                if let Some(idx) = cycle(current, protections.len(), dir) {
                    let id = protections[idx].id.clone();
                    let result = self.session.select_protection(&id);
                    self.report(result);
                }
            }
            ForgeField::Tool => {
                let tools = self.session.codex().tools();
                let current = tools.iter().position(|t| t.id == selection.tool_id);
                if let Some(idx) = cycle(current, tools.len(), dir) {
                    let id = tools[idx].id.clone();
                    let result = self.session.select_tool(&id);
                    self.report(result);
                }
            }
            ForgeField::Reinforcement => self.session.adjust_reinforcement(dir),
            ForgeField::Buff => self.session.adjust_buff(dir),
        }
    }

    /// Enter/Space on the forge: whatever the invocation state calls for next
    pub fn primary_action(&mut self) {
        match self.session.state().clone() {
            InvocationState::Idle | InvocationState::Complete => {
                let result = self.session.cast();
                if self.report(result).is_some() {
                    self.trace_scroll = 0;
                    self.set_status("Invocation started...");
                }
            }
            InvocationState::Ready => {
                let result = self.session.finalize();
                if let Some(entry) = self.report(result) {
                    self.set_status(format!(
                        "✓ {} manifested ({} dmg) and recorded as {}",
                        entry.spell.name, entry.spell.predicted_damage, entry.id
                    ));
                }
            }
            InvocationState::AwaitingFate => {
                let result = self.session.roll_fate();
                if let Some(die) = self.report(result) {
                    if die == 1 {
                        self.set_status("🎲 1! A miracle answers the call.");
                    } else {
                        self.set_status(format!("🎲 {}... fate looks away.", die));
                    }
                }
            }
            InvocationState::Error(_) => {
                let result = self.session.acknowledge();
                if self.report(result).is_some() {
                    self.set_status("Ready.");
                }
            }
            InvocationState::Analyzing | InvocationState::Manifesting => {
                self.set_status("Invocation in progress...");
            }
        }
    }

    pub fn reset(&mut self) {
        match self.current_tab {
            Tab::Battle => {
                self.session.reset_battle();
                self.log_scroll = 0;
                self.set_status("Battle reset.");
            }
            _ => {
                self.session.reset();
                self.trace_scroll = 0;
                self.set_status("Invocation reset.");
            }
        }
    }

    pub fn scroll_trace(&mut self, delta: i32) {
        self.trace_scroll = (self.trace_scroll as i64 + delta as i64).max(0) as usize;
    }

    pub fn toggle_simulation(&mut self) {
        self.session.toggle_simulation();
        let state = if self.session.simulation_enabled() { "on" } else { "off" };
        self.set_status(format!("Sensor simulation {}", state));
    }

    pub fn reroll_environment(&mut self) {
        self.session.reroll_environment();
        let env = self.session.environment();
        self.status = format!(
            "Environment: {} {:.1}°C {}% W={}",
            env.weather, env.temperature, env.humidity, env.w_density
        );
    }

    pub fn drift_body_temp(&mut self) {
        self.session.drift_body_temp();
        self.status = format!("Body temperature {:.1}°C", self.session.caster().body_temp);
    }

    // === Prompt ===

    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn start_prompt(&mut self, kind: PromptKind) {
        let buffer = match &kind {
            PromptKind::Search => self.grimoire_query.search.clone(),
            PromptKind::RenameEntry(id) => self
                .session
                .grimoire()
                .get(id)
                .map(|e| e.spell.name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        self.prompt = Some(Prompt { kind, buffer });
    }

    pub fn prompt_input(&mut self, c: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.buffer.push(c);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.buffer.pop();
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn submit_prompt(&mut self) {
        let Some(Prompt { kind, buffer }) = self.prompt.take() else {
            return;
        };
        match kind {
            PromptKind::CharacterName => {
                let result = self.session.add_character(&buffer);
                if let Some(id) = self.report(result) {
                    self.set_status(format!("Persona '{}' created ({})", buffer.trim(), id));
                }
            }
            PromptKind::DraftName => self.add_manual_spell(buffer),
            PromptKind::RenameEntry(id) => self.rename_entry(&id, buffer),
            PromptKind::Search => {
                self.grimoire_query.search = buffer.trim().to_string();
                self.selected_entry = 0;
            }
            PromptKind::ImportPath => self.import_file(buffer.trim()),
        }
    }

    // === Grimoire ===

    pub fn visible_entries(&self) -> Vec<&ManifestedSpell> {
        self.session.grimoire().query(&self.grimoire_query)
    }

    pub fn selected_entry_id(&self) -> Option<String> {
        self.visible_entries()
            .get(self.selected_entry)
            .map(|e| e.id.clone())
    }

    /// All systems, then each system in turn
    pub fn cycle_grimoire_filter(&mut self) {
        let systems = MagicSystem::all();
        self.grimoire_query.system = match self.grimoire_query.system {
            None => systems.first().copied(),
            Some(current) => {
                let idx = systems.iter().position(|s| *s == current).unwrap_or(0);
                systems.get(idx + 1).copied()
            }
        };
        self.selected_entry = 0;
    }

    pub fn cycle_grimoire_sort(&mut self) {
        self.grimoire_query.sort = self.grimoire_query.sort.next();
        self.selected_entry = 0;
    }

    /// Load the selected entry into the forge as the known spell
    pub fn use_selected_entry(&mut self) {
        let Some(id) = self.selected_entry_id() else {
            return;
        };
        let result = self.session.select_grimoire_entry(&id);
        if self.report(result).is_some() {
            self.current_tab = Tab::Forge;
            self.set_status(format!("Known spell {} loaded into the forge", id));
        }
    }

    pub fn delete_selected_entry(&mut self) {
        let Some(id) = self.selected_entry_id() else {
            return;
        };
        let result = self.session.delete_spell(&id);
        if self.report(result).is_some() {
            let len = self.visible_entries().len();
            self.selected_entry = self.selected_entry.min(len.saturating_sub(1));
            self.set_status(format!("Deleted {}", id));
        }
    }

    pub fn clear_grimoire(&mut self) {
        self.session.clear_grimoire();
        self.selected_entry = 0;
        self.set_status("Grimoire cleared.");
    }

    pub fn rename_selected_entry(&mut self) {
        if let Some(id) = self.selected_entry_id() {
            self.start_prompt(PromptKind::RenameEntry(id));
        }
    }

    /// Register the current forge selection as a manual entry
    fn add_manual_spell(&mut self, name: String) {
        let selection = self.session.selection().clone();
        let preview = self.session.preview();
        let mut draft = SpellDraft::blank(self.session.codex());
        draft.name = name;
        draft.system = selection.system;
        draft.attribute = selection.attribute;
        draft.rank = selection.rank;
        draft.predicted_damage = preview.predicted_damage;
        draft.chant = preview.chant;
        draft.protection_id = selection.protection_id;

        let result = self.session.save_draft(&draft, None);
        if let Some(id) = self.report(result) {
            self.set_status(format!("Manual spell saved as {}", id));
        }
    }

    fn rename_entry(&mut self, id: &str, name: String) {
        let Some(entry) = self.session.grimoire().get(id) else {
            self.set_status(format!("✗ Unknown grimoire entry '{}'", id));
            return;
        };
        let mut draft = SpellDraft::from_entry(entry);
        draft.name = name;
        let result = self.session.save_draft(&draft, Some(id));
        if self.report(result).is_some() {
            self.set_status(format!("Renamed {}", id));
        }
    }

    // === Codex ===

    pub fn codex(&self) -> &Codex {
        self.session.codex()
    }

    pub fn codex_len(&self) -> usize {
        let codex = self.session.codex();
        match self.codex_section {
            CodexSection::Attributes => codex.attributes().len(),
            CodexSection::Protections => codex.protections().len(),
            CodexSection::Tools => codex.tools().len(),
            CodexSection::Characters => codex.characters().len(),
            CodexSection::Ranks => 7,
            CodexSection::Enemies => codex.enemies().len(),
        }
    }

    fn cycle_codex_section(&mut self, dir: i8) {
        let sections = CodexSection::all();
        let current = sections.iter().position(|s| *s == self.codex_section);
        if let Some(idx) = cycle(current, sections.len(), dir) {
            self.codex_section = sections[idx];
            self.codex_selected = 0;
        }
    }

    /// Enter on a codex row: use it in the forge (or battle)
    pub fn apply_codex_selection(&mut self) {
        let idx = self.codex_selected;
        match self.codex_section {
            CodexSection::Attributes => {
                let Some(attr) = self.session.codex().attributes().get(idx).cloned() else {
                    return;
                };
                self.session.select_system(attr.system);
                let result = self.session.select_attribute(&attr.name);
                if self.report(result).is_some() {
                    self.set_status(format!("Attribute {} ({}) selected", attr.name, attr.system));
                }
            }
            CodexSection::Protections => {
                let Some(id) = self.session.codex().protections().get(idx).map(|p| p.id.clone()) else {
                    return;
                };
                let result = self.session.select_protection(&id);
                if self.report(result).is_some() {
                    self.set_status(format!("Protection {} selected", id));
                }
            }
            CodexSection::Tools => {
                let Some(id) = self.session.codex().tools().get(idx).map(|t| t.id.clone()) else {
                    return;
                };
                let result = self.session.select_tool(&id);
                if self.report(result).is_some() {
                    self.set_status(format!("Tool {} selected", id));
                }
            }
            CodexSection::Characters => {
                let Some(id) = self.session.codex().characters().get(idx).map(|c| c.id.clone()) else {
                    return;
                };
                let result = self.session.apply_character(&id);
                if self.report(result).is_some() {
                    self.set_status(format!("Persona {} applied", id));
                }
            }
            CodexSection::Ranks => {
                self.session.set_rank(idx as u8 + 1);
                self.set_status(format!("Rank set to {}", self.session.selection().rank));
            }
            CodexSection::Enemies => {
                let Some(id) = self.session.codex().enemies().get(idx).map(|e| e.id.clone()) else {
                    return;
                };
                let result = self.session.select_enemy(&id);
                if self.report(result).is_some() {
                    self.current_tab = Tab::Battle;
                    self.log_scroll = 0;
                    self.set_status(format!("Now facing {}", id));
                }
            }
        }
    }

    /// +/- on a persona row edits its activity rate
    pub fn adjust_selected_character(&mut self, delta: f64) {
        if self.current_tab != Tab::Codex || self.codex_section != CodexSection::Characters {
            return;
        }
        let Some(mut character) = self
            .session
            .codex()
            .characters()
            .get(self.codex_selected)
            .cloned()
        else {
            return;
        };
        character.activity_rate = slider::nudge(character.activity_rate, delta, 0.0, 100.0);
        let result = self.session.update_character(character);
        self.report(result);
    }

    // === Battle ===

    pub fn adjust_focus(&mut self, delta: f64) {
        let focus = self.session.battle_focus() + delta;
        self.session.set_battle_focus(focus);
    }

    pub fn battle_act(&mut self) {
        let result = self.session.battle_act();
        if let Some(turn) = self.report(result) {
            self.set_status(format!("{}: {}", turn.stance.name(), turn.entry.display()));
        }
    }

    /// Face the next enemy in the codex roster
    pub fn next_enemy(&mut self) {
        let enemies = self.session.codex().enemies();
        let current = self
            .session
            .battle()
            .and_then(|b| enemies.iter().position(|e| e.id == b.enemy().id));
        if let Some(idx) = cycle(current, enemies.len(), 1) {
            let id = enemies[idx].id.clone();
            let result = self.session.select_enemy(&id);
            if self.report(result).is_some() {
                self.log_scroll = 0;
            }
        }
    }

    // === Import ===

    pub fn import_file(&mut self, path: &str) {
        match self.session.import_file(path) {
            Ok(report) => {
                let message = format!(
                    "✓ {}: {} new attribute(s), {} updated",
                    path, report.added, report.updated
                );
                self.import_history.push(message.clone());
                self.set_status(message);
            }
            Err(e) => {
                let message = format!("✗ {}: {}", path, e);
                self.import_history.push(message.clone());
                self.set_status(message);
            }
        }
    }

    // === Time ===

    pub fn tick(&mut self, delta: f64) {
        self.time_elapsed += delta;
        let report = self.session.tick(delta);

        if let Some(state) = report.state_changed {
            match state {
                InvocationState::Ready => {
                    self.set_status("Manifestation complete. [Enter] to release the spell.")
                }
                InvocationState::AwaitingFate => self.set_status(
                    "The spell falters... but fate stirs. [Enter] to roll the die.",
                ),
                InvocationState::Error(reason) => self.set_status(format!("✗ {}", reason)),
                _ => {}
            }
        }
        if let Some(entry) = report.enemy_action {
            self.set_status(entry.display());
        }
    }
}

impl Default for App {
    fn default() -> Self {
        App::new(Session::new(ForgeConfig::default(), Codex::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_core::grimoire::SortOrder;

    fn app() -> App {
        let mut config = ForgeConfig {
            seed: Some(42),
            ..ForgeConfig::default()
        };
        config.simulation.enabled = false;
        App::new(Session::new(config, Codex::default()))
    }

    #[test]
    fn test_tab_cycling() {
        let mut app = app();
        app.prev_tab();
        assert_eq!(app.current_tab, Tab::Help);
        app.next_tab();
        assert_eq!(app.current_tab, Tab::Forge);
        app.set_tab(3);
        assert_eq!(app.current_tab, Tab::Battle);
        app.set_tab(99);
        assert_eq!(app.current_tab, Tab::Battle);
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(Some(0), 3, -1), Some(2));
        assert_eq!(cycle(Some(2), 3, 1), Some(0));
        assert_eq!(cycle(None, 3, -1), Some(0));
        assert_eq!(cycle(Some(1), 0, 1), None);
    }

    #[test]
    fn test_forge_fields_adjust_session() {
        let mut app = app();
        app.forge_field = ForgeField::System;
        app.adjust_field(1);
        assert_eq!(app.session.selection().system, MagicSystem::Causal);
        assert_eq!(app.session.selection().attribute, "律界域");

        app.on_down();
        assert_eq!(app.forge_field, ForgeField::Attribute);
        app.on_right();
        assert_eq!(app.session.selection().attribute, "時空域");

        app.forge_field = ForgeField::Hp;
        app.on_left();
        assert_eq!(app.session.caster().hp, 95);

        app.forge_field = ForgeField::Buff;
        for _ in 0..8 {
            app.on_right();
        }
        assert_eq!(app.session.selection().buff_level, 5);
    }

    #[test]
    fn test_character_prompt() {
        let mut app = app();
        app.start_prompt(PromptKind::CharacterName);
        for c in "Mira".chars() {
            app.prompt_input(c);
        }
        app.prompt_input('x');
        app.prompt_backspace();
        app.submit_prompt();
        assert!(!app.is_prompting());
        let id = app.session.selection().character_id.clone().unwrap();
        assert_eq!(app.session.codex().character(&id).map(|c| c.name.as_str()), Some("Mira"));

        app.start_prompt(PromptKind::CharacterName);
        app.submit_prompt();
        assert!(app.status.starts_with('✗'));
    }

    #[test]
    fn test_grimoire_filter_and_sort() {
        let mut app = app();
        assert_eq!(app.visible_entries().len(), 1);
        app.cycle_grimoire_filter();
        assert_eq!(app.grimoire_query.system, Some(MagicSystem::Elemental));
        app.cycle_grimoire_filter();
        assert_eq!(app.visible_entries().len(), 0);
        for _ in 0..4 {
            app.cycle_grimoire_filter();
        }
        assert_eq!(app.grimoire_query.system, None);

        app.cycle_grimoire_sort();
        assert_eq!(app.grimoire_query.sort, SortOrder::Oldest);
    }

    #[test]
    fn test_manual_spell_and_rename() {
        let mut app = app();
        app.start_prompt(PromptKind::DraftName);
        for c in "Ember Note".chars() {
            app.prompt_input(c);
        }
        app.submit_prompt();
        let entry = app
            .session
            .grimoire()
            .entries()
            .iter()
            .find(|e| e.spell.name == "Ember Note")
            .cloned()
            .unwrap();
        assert!(entry.id.starts_with("MG"));

        app.start_prompt(PromptKind::RenameEntry(entry.id.clone()));
        assert_eq!(app.prompt.as_ref().map(|p| p.buffer.as_str()), Some("Ember Note"));
        app.cancel_prompt();
        app.start_prompt(PromptKind::RenameEntry(entry.id.clone()));
        app.prompt_backspace();
        app.submit_prompt();
        assert_eq!(
            app.session.grimoire().get(&entry.id).map(|e| e.spell.name.as_str()),
            Some("Ember Not")
        );
    }

    #[test]
    fn test_codex_persona_edit() {
        let mut app = app();
        app.current_tab = Tab::Codex;
        app.on_right();
        app.on_right();
        app.on_right();
        assert_eq!(app.codex_section, CodexSection::Characters);
        let before = app.session.codex().characters()[0].activity_rate;
        app.adjust_selected_character(-10.0);
        let after = app.session.codex().characters()[0].activity_rate;
        assert!((before - 10.0 - after).abs() < 1e-9);
    }
}
