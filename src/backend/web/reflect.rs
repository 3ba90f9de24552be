//! Calls into JS objects by property name, for the variants that skip the
//! typed bindings.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::Error;

/// `target[name]`.
pub fn get(target: &JsValue, name: &str) -> Result<JsValue, Error> {
    Ok(Reflect::get(target, &JsValue::from_str(name))?)
}

/// `target[method](...args)`.
pub fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, Error> {
    let function = get(target, method)?
        .dyn_into::<Function>()
        .map_err(|_| Error::Host(format!("`{}` is not a function", method)))?;
    let args: Array = args.iter().collect();
    Ok(Reflect::apply(&function, target, &args)?)
}

/// Like `call`, but a `null`/`undefined` result is an allocation failure.
pub fn create(
    target: &JsValue,
    method: &str,
    args: &[JsValue],
    kind: &'static str,
) -> Result<JsValue, Error> {
    let value = call(target, method, args)?;
    if value.is_null() || value.is_undefined() {
        return Err(Error::Allocation(kind));
    }
    Ok(value)
}

/// `getContext("webgl")` on a canvas, `None` when it comes back empty.
pub fn webgl_context(canvas: &JsValue) -> Result<Option<JsValue>, Error> {
    let gl = call(canvas, "getContext", &[JsValue::from_str("webgl")])?;
    if gl.is_null() || gl.is_undefined() {
        return Ok(None);
    }
    Ok(Some(gl))
}

pub fn float32_array(data: &[f32]) -> JsValue {
    js_sys::Float32Array::from(data).into()
}
