use crate::{
    def::{FieldId, ProcId},
    job::Compiler,
    ty::{ProcSig, Type},
};
use jv_syn::Flags;
use std::{cell::OnceCell, rc::Rc};

/// A field as seen from one use site. Its type is read from the definition the first time
/// it's asked for and remembered by this instance only.
#[derive(Clone, Debug)]
pub struct FieldInstance {
    pub def: FieldId,

    ty: OnceCell<Type>,
}

impl FieldInstance {
    pub fn new(def: FieldId) -> Self {
        Self {
            def,
            ty: OnceCell::new(),
        }
    }

    pub fn name(&self, comp: &Compiler) -> Rc<str> {
        comp.defs.field(self.def).name.clone()
    }

    pub fn flags(&self, comp: &Compiler) -> Flags {
        comp.defs.field(self.def).flags
    }

    pub fn ty(&self, comp: &mut Compiler) -> Type {
        if let Some(ty) = self.ty.get() {
            return ty.clone();
        }

        let ty = comp.field_type(self.def);
        self.ty.get_or_init(|| ty).clone()
    }
}

/// A method or constructor as seen from one use site. Flags and signature can be
/// overridden for members that behave differently on some receivers, like `clone` on
/// arrays.
#[derive(Clone, Debug)]
pub struct ProcInstance {
    pub def: ProcId,
    flags: Option<Flags>,

    sig: OnceCell<Rc<ProcSig>>,
}

impl ProcInstance {
    pub fn new(def: ProcId) -> Self {
        Self {
            def,
            flags: None,
            sig: OnceCell::new(),
        }
    }

    pub fn with_flags(&self, flags: Flags) -> Self {
        Self {
            def: self.def,
            flags: Some(flags),
            sig: self.sig.clone(),
        }
    }

    pub fn with_sig(&self, sig: ProcSig) -> Self {
        Self {
            def: self.def,
            flags: self.flags,
            sig: OnceCell::from(Rc::new(sig)),
        }
    }

    pub fn name(&self, comp: &Compiler) -> Rc<str> {
        comp.defs.proc(self.def).name.clone()
    }

    pub fn flags(&self, comp: &Compiler) -> Flags {
        self.flags.unwrap_or_else(|| comp.defs.proc(self.def).flags)
    }

    pub fn sig(&self, comp: &mut Compiler) -> Rc<ProcSig> {
        if let Some(sig) = self.sig.get() {
            return sig.clone();
        }

        let sig = comp.proc_sig(self.def);
        self.sig.get_or_init(|| sig).clone()
    }
}
