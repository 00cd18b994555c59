use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine::combat::{CombatantKind, Encounter, EncounterAction};
use engine::content;
use engine::modifiers::{apply_modifiers, modifiers_for, vantage, Modifier};
use engine::progression::{progress_to_next_level, ExperienceTracker};
use engine::validation::{validate_character_creation, CharacterDraft};
use engine::{level_from_xp, xp_to_next_level, CharacterSheet, Dice, RulesConfig};
use serde::de::DeserializeOwned;
use std::{fs, path::PathBuf};
use tracing::Level;

#[derive(Copy, Clone, ValueEnum)]
enum Roll {
    /// Roll for NPCs and monsters only
    Monsters,
    /// Roll for everyone
    All,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show the level derived from an XP total
    Level {
        #[arg(long)]
        xp: u32,
    },
    /// Award XP and print one line per level gained
    Award {
        /// Current XP total
        #[arg(long)]
        xp: u32,
        /// XP to add (negative removes)
        #[arg(long, allow_hyphen_values = true)]
        amount: i64,
    },
    /// Validate a character draft JSON file
    Validate {
        #[arg(long)]
        file: PathBuf,
    },
    /// Resolve a base value through a JSON list of modifiers
    Resolve {
        #[arg(long, allow_hyphen_values = true)]
        base: i32,
        /// Path to a JSON modifier list
        #[arg(long, conflicts_with = "pack")]
        modifiers: Option<PathBuf>,
        /// Builtin modifier pack id
        #[arg(long)]
        pack: Option<String>,
        /// Only apply modifiers addressed to this target
        #[arg(long)]
        target: Option<String>,
    },
    /// Print the combat numbers derived from a character sheet JSON file
    Sheet {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replay a JSON action list against an encounter and print the result
    Encounter {
        /// Builtin encounter id
        #[arg(long, default_value = "goblin_ambush")]
        builtin: String,
        /// Roster JSON file (overrides --builtin)
        #[arg(long)]
        roster: Option<PathBuf>,
        /// Action list JSON file
        #[arg(long)]
        actions: Option<PathBuf>,
        /// Roll initiative before applying actions
        #[arg(long, value_enum)]
        roll: Option<Roll>,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the final state as JSON instead of a summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Parser)]
#[command(name = "tabletop")]
#[command(about = "Character sheet and encounter engine harness")]
struct Cli {
    /// Rules config (JSON or YAML)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Log every engine transition
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let rules = match &cli.rules {
        Some(path) => RulesConfig::load(path)
            .with_context(|| format!("failed to load rules from {}", path.display()))?,
        None => RulesConfig::default(),
    };

    match cli.cmd {
        Cmd::Level { xp } => {
            println!(
                "level={} next_in={} progress={:.2}",
                level_from_xp(xp),
                xp_to_next_level(xp),
                progress_to_next_level(xp)
            );
        }
        Cmd::Award { xp, amount } => {
            let mut tracker = ExperienceTracker::new(xp);
            for up in tracker.add_xp(amount) {
                println!("LEVEL UP → {}", up.level);
            }
            println!("xp={} level={}", tracker.xp(), tracker.level());
        }
        Cmd::Validate { file } => {
            let draft: CharacterDraft = read_json(&file)?;
            let report = validate_character_creation(&draft, &rules);
            if report.valid {
                println!("valid");
            } else {
                for e in &report.errors {
                    println!("{}", e);
                }
                bail!("{} validation error(s)", report.errors.len());
            }
        }
        Cmd::Resolve {
            base,
            modifiers,
            pack,
            target,
        } => {
            let mods: Vec<Modifier> = match (modifiers, pack) {
                (Some(path), _) => read_json(&path)?,
                (None, Some(id)) => content::load_modifier_pack(&id)?,
                (None, None) => Vec::new(),
            };
            let mods = match target {
                Some(t) => modifiers_for(&t, &mods),
                None => mods,
            };
            println!(
                "value={} vantage={:?}",
                apply_modifiers(base, &mods),
                vantage(&mods)
            );
        }
        Cmd::Sheet { file } => {
            let sheet: CharacterSheet = read_json(&file)?;
            println!("{}", serde_json::to_string_pretty(&sheet.combat_stats())?);
        }
        Cmd::Encounter {
            builtin,
            roster,
            actions,
            roll,
            seed,
            json,
        } => {
            let mut encounter = match roster {
                Some(path) => Encounter::with_combatants(rules, read_json(&path)?),
                None => content::load_encounter(&builtin, rules)?,
            };
            if let Some(roll) = roll {
                let kinds: &[CombatantKind] = match roll {
                    Roll::Monsters => &[CombatantKind::NPC, CombatantKind::Monster],
                    Roll::All => &[CombatantKind::PC, CombatantKind::NPC, CombatantKind::Monster],
                };
                encounter.roll_initiative(&mut Dice::from_seed(seed), kinds);
            }
            let script: Vec<EncounterAction> = match actions {
                Some(path) => read_json(&path)?,
                None => vec![EncounterAction::StartCombat],
            };
            encounter.apply_all(script);

            if json {
                println!("{}", serde_json::to_string_pretty(&encounter)?);
            } else {
                print_summary(&encounter);
            }
        }
    }
    Ok(())
}

fn print_summary(encounter: &Encounter) {
    println!(
        "phase={:?} round={} active={}",
        encounter.phase(),
        encounter.round(),
        encounter
            .active_combatant()
            .map(|c| c.name.as_str())
            .unwrap_or("-")
    );
    for c in encounter.combatants() {
        let hp = &c.hit_points;
        let conditions: Vec<&str> = c.conditions.iter().map(|x| x.name()).collect();
        println!(
            "{} {} init={} AC={} HP={}/{}{} [{}]",
            if c.is_active_turn { "▶" } else { " " },
            c.name,
            c.initiative,
            c.armor_class,
            hp.current,
            hp.max,
            if hp.temp > 0 {
                format!(" (+{} temp)", hp.temp)
            } else {
                String::new()
            },
            conditions.join(", ")
        );
    }
}
