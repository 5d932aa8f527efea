use std::fmt::{self, Write};

use heck::ToLowerCamelCase;
use varlink_idl::{ErrorDeclaration, Interface, Member, Method, TypeKind, TypeRef};

use super::common::{walk, GeneratorContext, InterfaceVisitor};

#[derive(Default)]
pub struct TypescriptVisitor {
    output: String,
}

impl TypescriptVisitor {
    fn emit(&mut self, args: fmt::Arguments<'_>) {
        self.output
            .write_fmt(args)
            .expect("writing to a String cannot fail");
    }

    fn compute_type(ctx: &GeneratorContext, type_: TypeRef) -> String {
        match &ctx.interface.get(type_).kind {
            TypeKind::Struct(_) | TypeKind::Enum(_) => ctx.declaration_name(type_).to_string(),
            TypeKind::Bool => "boolean".to_string(),
            TypeKind::Int | TypeKind::Float => "number".to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::Object => "unknown".to_string(),
            TypeKind::Maybe(inner) => format!("{} | null", Self::compute_type(ctx, *inner)),
            TypeKind::Array(inner) => {
                let inner = Self::compute_type(ctx, *inner);
                if inner.contains('|') {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeKind::Dictionary(inner) => {
                format!("Record<string, {}>", Self::compute_type(ctx, *inner))
            }
        }
    }
}

impl InterfaceVisitor for TypescriptVisitor {
    fn visit_struct(
        &mut self,
        ctx: &GeneratorContext,
        _type: TypeRef,
        name: &str,
        members: &[Member],
    ) {
        self.emit(format_args!("\nexport interface {name} {{\n"));
        for member in members {
            let member_type = member.type_.expect("struct member without type");
            let optional = match ctx.interface.get(member_type).kind {
                TypeKind::Maybe(_) => "?",
                _ => "",
            };
            let type_ = Self::compute_type(ctx, member_type);
            self.emit(format_args!("  {}{optional}: {type_};\n", member.name));
        }
        self.output.push_str("}\n");
    }

    fn visit_enum(
        &mut self,
        _ctx: &GeneratorContext,
        _type: TypeRef,
        name: &str,
        members: &[Member],
    ) {
        let variants = members
            .iter()
            .map(|member| format!("\"{}\"", member.name))
            .collect::<Vec<_>>()
            .join(" | ");
        self.emit(format_args!("\nexport type {name} = {variants};\n"));
    }

    fn visit_errors(&mut self, ctx: &GeneratorContext, errors: &[ErrorDeclaration]) {
        self.emit(format_args!("\nexport type {} =\n", ctx.error_name));
        for error in errors {
            let qualified = ctx.qualified(&error.name);
            match ctx.wrapper(error.type_) {
                Some(args) => self.emit(format_args!(
                    "  | {{ error: \"{qualified}\"; parameters: {args} }}\n"
                )),
                None => self.emit(format_args!("  | {{ error: \"{qualified}\" }}\n")),
            }
        }
        // Terminate the union.
        self.output.pop();
        self.output.push_str(";\n");
    }

    fn visit_methods(&mut self, ctx: &GeneratorContext, methods: &[Method]) {
        self.emit(format_args!(
            "
/** Sends one call and resolves with the `parameters` of its reply. */
export interface Transport {{
  call(method: string, parameters: object): Promise<unknown>;
}}

/** Client for the `{}` interface. */
export class {} {{
  constructor(private readonly transport: Transport) {{}}
",
            ctx.interface.name, ctx.client_name
        ));
        for method in methods {
            let name = method.name.to_lower_camel_case();
            let qualified = ctx.qualified(&method.name);
            let (argument, parameters) = match ctx.wrapper(method.parameter_type) {
                Some(args) => (format!("args: {args}"), "args"),
                None => (String::new(), "{}"),
            };
            match ctx.wrapper(method.return_type) {
                Some(result) => self.emit(format_args!(
                    "
  async {name}({argument}): Promise<{result}> {{
    return (await this.transport.call(\"{qualified}\", {parameters})) as {result};
  }}
"
                )),
                None => self.emit(format_args!(
                    "
  async {name}({argument}): Promise<void> {{
    await this.transport.call(\"{qualified}\", {parameters});
  }}
"
                )),
            }
        }
        self.output.push_str("}\n");
    }
}

pub fn generate(interface: &Interface) -> String {
    let ctx = GeneratorContext::new(interface);
    let mut visitor = TypescriptVisitor::default();

    visitor.emit(format_args!(
        "// Generated by {} {} from `{}`\n\nexport const INTERFACE_NAME = \"{}\";\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        interface.name,
        interface.name
    ));

    walk(&mut visitor, &ctx);
    visitor.output
}
