use serde::{Deserialize, Serialize};

use super::{Combatant, Encounter};
use crate::conditions::Condition;

/// One user action against an encounter. A saved action list can be replayed with
/// [`Encounter::apply_all`] to rebuild the state it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EncounterAction {
    AddCombatant { combatant: Combatant },
    RemoveCombatant { id: String },
    SetInitiative { id: String, initiative: i32 },
    StartCombat,
    NextTurn,
    PreviousTurn,
    EndCombat,
    ClearCombat,
    AdjustHp { id: String, delta: i32 },
    SetTempHp { id: String, value: i32 },
    AddCondition { id: String, condition: Condition },
    RemoveCondition { id: String, condition: Condition },
    AddDeathSave { id: String, success: bool },
    ResetDeathSaves { id: String },
    SetNotes { id: String, notes: String },
}

impl Encounter {
    pub fn apply(&mut self, action: EncounterAction) {
        use EncounterAction::*;
        match action {
            AddCombatant { combatant } => {
                self.add_combatant(combatant);
            }
            RemoveCombatant { id } => self.remove_combatant(&id),
            SetInitiative { id, initiative } => self.set_initiative(&id, initiative),
            StartCombat => self.start_combat(),
            NextTurn => self.next_turn(),
            PreviousTurn => self.previous_turn(),
            EndCombat => self.end_combat(),
            ClearCombat => self.clear_combat(),
            AdjustHp { id, delta } => self.adjust_hp(&id, delta),
            SetTempHp { id, value } => self.set_temp_hp(&id, value),
            AddCondition { id, condition } => self.add_condition(&id, condition),
            RemoveCondition { id, condition } => self.remove_condition(&id, condition),
            AddDeathSave { id, success } => self.add_death_save(&id, success),
            ResetDeathSaves { id } => self.reset_death_saves(&id),
            SetNotes { id, notes } => self.set_notes(&id, notes),
        }
    }

    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = EncounterAction>) {
        for action in actions {
            self.apply(action);
        }
    }
}
