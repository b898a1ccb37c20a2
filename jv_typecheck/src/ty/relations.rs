use crate::{
    def::ClassId,
    job::Compiler,
    ty::{ConstValue, Primitive, Type},
};
use std::collections::{HashSet, VecDeque};

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const THROWABLE: &str = "java.lang.Throwable";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
pub const ERROR: &str = "java.lang.Error";

// every array type implements these
const ARRAY_SUPERTYPES: [&str; 3] = [OBJECT, "java.lang.Cloneable", "java.io.Serializable"];

impl Compiler {
    /// `class` followed by all of its supertypes, breadth-first: the superclass of each
    /// class before its interfaces. Every class appears once even if the hierarchy is
    /// cyclic.
    pub fn supertype_closure(&mut self, class: ClassId) -> Vec<ClassId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut result = Vec::new();

        queue.push_back(class);
        while let Some(next) = queue.pop_front() {
            if !visited.insert(next) {
                continue;
            }
            result.push(next);

            for supertype in self.direct_supertypes(next) {
                if let Some(id) = supertype.as_class() {
                    queue.push_back(id);
                }
            }
        }

        result
    }

    pub fn is_object(&self, class: ClassId) -> bool {
        *self.defs.class(class).full_name == *OBJECT
    }

    /// Whether `sub` is `sup` or inherits from it. Every class and interface is a subclass
    /// of `java.lang.Object`.
    pub fn is_subclass(&mut self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup || self.is_object(sup) {
            return true;
        }

        self.supertype_closure(sub).contains(&sup)
    }

    pub fn is_subtype(&mut self, sub: &Type, sup: &Type) -> bool {
        if sub == sup || sub.is_unknown() || sup.is_unknown() {
            return true;
        }

        match (sub, sup) {
            (Type::Null, _) => sup.is_reference(),
            (Type::Class(sub_class), Type::Class(sup_class)) => self.is_subclass(sub_class.id, sup_class.id),
            (Type::Array(..), Type::Class(sup_class)) => {
                let name = &self.defs.class(sup_class.id).full_name;
                ARRAY_SUPERTYPES.iter().any(|array_super| **name == **array_super)
            },
            (Type::Array(sub_array), Type::Array(sup_array)) => {
                if sub_array.elem.is_reference() && sup_array.elem.is_reference() {
                    self.is_subtype(&sub_array.elem, &sup_array.elem)
                } else {
                    sub_array.elem == sup_array.elem
                }
            },
            _ => false,
        }
    }

    /// Whether a value of type `from` can be used where `to` is expected without a cast:
    /// identity, primitive widening, or a reference to a supertype.
    pub fn is_implicit_castable(&mut self, from: &Type, to: &Type) -> bool {
        if from == to || from.is_unknown() || to.is_unknown() {
            return true;
        }

        match (from, to) {
            (Type::Primitive(from_prim), Type::Primitive(to_prim)) => {
                *from_prim != Primitive::Void && from_prim.widens_to(*to_prim)
            },
            (Type::Primitive(..), _) | (_, Type::Primitive(..)) => false,
            _ => self.is_subtype(from, to),
        }
    }

    /// Assignment conversion: implicit casts, plus narrowing of an `int` constant to
    /// `byte`, `short` or `char` when the value fits.
    pub fn is_assignable(&mut self, from: &Type, constant: Option<&ConstValue>, to: &Type) -> bool {
        if self.is_implicit_castable(from, to) {
            return true;
        }

        let narrowable = matches!(
            from.as_primitive(),
            Some(Primitive::Int | Primitive::Short | Primitive::Char | Primitive::Byte)
        );
        match (constant, to.as_primitive()) {
            (Some(constant), Some(target)) if narrowable => constant.fits(target),
            _ => false,
        }
    }

    /// Whether an explicit cast from `from` to `to` is allowed.
    pub fn is_castable(&mut self, from: &Type, to: &Type) -> bool {
        if self.is_implicit_castable(from, to) {
            return true;
        }

        match (from, to) {
            (Type::Primitive(from_prim), Type::Primitive(to_prim)) => {
                (from_prim.is_numeric() && to_prim.is_numeric()) || from_prim == to_prim
            },

            (Type::Null, _) => to.is_reference(),

            (Type::Class(from_class), Type::Class(to_class)) => {
                if self.is_subclass(to_class.id, from_class.id) {
                    return true;
                }

                let from_def = self.defs.class(from_class.id);
                let to_def = self.defs.class(to_class.id);
                match (from_def.is_interface(), to_def.is_interface()) {
                    (true, true) => true,
                    (true, false) => !to_def.flags.is_final(),
                    (false, true) => !from_def.flags.is_final(),
                    (false, false) => false,
                }
            },

            (Type::Class(from_class), Type::Array(..)) => {
                let name = &self.defs.class(from_class.id).full_name;
                ARRAY_SUPERTYPES.iter().any(|array_super| **name == **array_super)
            },

            (Type::Array(from_array), Type::Array(to_array)) => {
                if from_array.elem.is_reference() && to_array.elem.is_reference() {
                    self.is_castable(&from_array.elem, &to_array.elem)
                } else {
                    from_array.elem == to_array.elem
                }
            },

            _ => false,
        }
    }

    /// Unary numeric promotion.
    pub fn numeric_promote(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Unknown => Some(Type::Unknown),
            _ => ty.as_primitive()?.promote().map(Type::Primitive),
        }
    }

    /// Binary numeric promotion.
    pub fn numeric_promote_binary(&self, a: &Type, b: &Type) -> Option<Type> {
        match (a, b) {
            (Type::Unknown, other) | (other, Type::Unknown) => match other {
                Type::Unknown => Some(Type::Unknown),
                _ => self.numeric_promote(other),
            },
            _ => a.as_primitive()?.promote_binary(b.as_primitive()?).map(Type::Primitive),
        }
    }

    /// The most specific type both `a` and `b` convert to, used for the type of a
    /// conditional expression.
    pub fn least_common_ancestor(&mut self, a: &Type, b: &Type) -> Option<Type> {
        if a.is_unknown() {
            return Some(b.clone());
        }
        if b.is_unknown() || a == b {
            return Some(a.clone());
        }

        if a.is_numeric() && b.is_numeric() {
            if self.is_implicit_castable(a, b) {
                return Some(b.clone());
            }
            if self.is_implicit_castable(b, a) {
                return Some(a.clone());
            }
            return self.numeric_promote_binary(a, b);
        }

        if !a.is_reference() || !b.is_reference() {
            return None;
        }

        if self.is_subtype(a, b) {
            return Some(b.clone());
        }
        if self.is_subtype(b, a) {
            return Some(a.clone());
        }

        if let (Some(a_elem), Some(b_elem)) = (a.array_elem(), b.array_elem()) {
            if a_elem.is_reference() && b_elem.is_reference() {
                if let Some(elem) = self.least_common_ancestor(a_elem, b_elem) {
                    return Some(self.defs.array_of(elem));
                }
            }
        }

        if let Some(mut class) = a.as_class() {
            let mut visited = HashSet::new();
            while let Some(superclass) = self.superclass(class).and_then(|ty| ty.as_class()) {
                if !visited.insert(superclass) {
                    break;
                }

                let superclass_ty = self.defs.class_type(superclass);
                if self.is_subtype(b, &superclass_ty) {
                    return Some(superclass_ty);
                }
                class = superclass;
            }
        }

        Some(self.object_type())
    }
}
