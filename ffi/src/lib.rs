use engine::combat::{Encounter, EncounterAction};
use engine::modifiers::{apply_modifiers, vantage, Modifier};
use engine::progression::{progress_to_next_level, xp_to_next_level, ExperienceTracker};
use engine::validation::{validate_character_creation, CharacterDraft};
use engine::RulesConfig;
use jni::objects::{JClass, JString};
use jni::sys::{jint, jlong, jstring};
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::{json, Value};

fn respond(env: &JNIEnv, result: Result<Value, String>) -> jstring {
    let payload = match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": e }),
    };
    match env.new_string(payload.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn read_input(env: &mut JNIEnv, json: &JString) -> Result<String, String> {
    env.get_string(json)
        .map(Into::into)
        .map_err(|e| format!("invalid_string: {}", e))
}

#[no_mangle]
pub extern "system" fn Java_com_tabletop_Ffi_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    match env.new_string("tabletop-ffi 0.1.0") {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_tabletop_Ffi_levelFromXp(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    xp: jlong,
) -> jint {
    ExperienceTracker::from_signed(xp).level() as jint
}

#[no_mangle]
pub extern "system" fn Java_com_tabletop_Ffi_awardXpJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|s| award_xp_internal(&s));
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_tabletop_Ffi_validateCharacterJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|s| validate_character_internal(&s));
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_tabletop_Ffi_resolveModifiersJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|s| resolve_internal(&s));
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_tabletop_Ffi_applyEncounterActionsJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|s| apply_actions_internal(&s));
    respond(&env, result)
}

// Internal functions for testing without JNI overhead

#[derive(Deserialize)]
struct AwardRequest {
    xp: i64,
    amount: i64,
}

pub fn award_xp_internal(input: &str) -> Result<Value, String> {
    let req: AwardRequest =
        serde_json::from_str(input).map_err(|e| format!("invalid_request: {}", e))?;
    let mut tracker = ExperienceTracker::from_signed(req.xp);
    let level_ups = tracker.add_xp(req.amount);
    Ok(json!({
        "xp": tracker.xp(),
        "level": tracker.level(),
        "xp_to_next_level": xp_to_next_level(tracker.xp()),
        "progress": progress_to_next_level(tracker.xp()),
        "level_ups": level_ups,
    }))
}

#[derive(Deserialize)]
struct ValidateRequest {
    draft: CharacterDraft,
    #[serde(default)]
    rules: RulesConfig,
}

pub fn validate_character_internal(input: &str) -> Result<Value, String> {
    let req: ValidateRequest =
        serde_json::from_str(input).map_err(|e| format!("invalid_request: {}", e))?;
    let report = validate_character_creation(&req.draft, &req.rules);
    serde_json::to_value(report).map_err(|e| e.to_string())
}

#[derive(Deserialize)]
struct ResolveRequest {
    base: i32,
    #[serde(default)]
    modifiers: Vec<Modifier>,
}

pub fn resolve_internal(input: &str) -> Result<Value, String> {
    let req: ResolveRequest =
        serde_json::from_str(input).map_err(|e| format!("invalid_request: {}", e))?;
    Ok(json!({
        "value": apply_modifiers(req.base, &req.modifiers),
        "vantage": vantage(&req.modifiers),
    }))
}

#[derive(Deserialize)]
struct ActionsRequest {
    #[serde(default)]
    state: Option<Encounter>,
    #[serde(default)]
    rules: RulesConfig,
    actions: Vec<EncounterAction>,
}

/// The UI thread sends the current state and the actions the user just took; it
/// re-renders from the returned state and events.
pub fn apply_actions_internal(input: &str) -> Result<Value, String> {
    let req: ActionsRequest =
        serde_json::from_str(input).map_err(|e| format!("invalid_request: {}", e))?;
    let mut encounter = req.state.unwrap_or_else(|| Encounter::new(req.rules));
    encounter.apply_all(req.actions);
    let events = encounter.drain_events();
    Ok(json!({ "state": encounter, "events": events }))
}
