use crate::lookup::Lookups;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use serde_json::Value;

/// `Lookup "KEY"`: environment first, then the variables
pub struct LookupHelper<'a> {
    lookups: &'a Lookups<'a>,
}

impl<'a> LookupHelper<'a> {
    pub fn new(lookups: &'a Lookups<'a>) -> Self {
        Self { lookups }
    }
}

impl HelperDef for LookupHelper<'_> {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let key = string_param(h, 0, "Lookup")?;

        self.lookups
            .lookup(key)
            .map(ScopedJson::Derived)
            .map_err(|e| self.lookups.fail(e))
    }
}

/// `LookupSecret "path" ["target/path"]`: renders a secret block
pub struct LookupSecretHelper<'a> {
    lookups: &'a Lookups<'a>,
}

impl<'a> LookupSecretHelper<'a> {
    pub fn new(lookups: &'a Lookups<'a>) -> Self {
        Self { lookups }
    }
}

impl HelperDef for LookupSecretHelper<'_> {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let path = string_param(h, 0, "LookupSecret")?;
        let target_path = match h.param(1) {
            Some(_) => Some(string_param(h, 1, "LookupSecret")?),
            None => None,
        };

        self.lookups
            .lookup_secret(path, target_path)
            .map(|block| ScopedJson::Derived(Value::String(block)))
            .map_err(|e| self.lookups.fail(e))
    }
}

/// Emits literal template text that was kept out of the handlebars source
pub struct VerbatimHelper {
    segments: Vec<String>,
}

impl VerbatimHelper {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl HelperDef for VerbatimHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let segment = h
            .param(0)
            .and_then(|p| p.value().as_u64())
            .and_then(|index| self.segments.get(index as usize))
            .ok_or(RenderErrorReason::InvalidParamType("segment index"))?;

        out.write(segment)?;
        Ok(())
    }
}

fn string_param<'h>(
    h: &'h Helper<'_>,
    index: usize,
    helper: &'static str,
) -> Result<&'h str, RenderError> {
    let param = h
        .param(index)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(helper, index))?;

    param
        .value()
        .as_str()
        .ok_or_else(|| RenderErrorReason::InvalidParamType("string").into())
}
