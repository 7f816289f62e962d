// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A shallow GLSL ES 1.00 front end: enough to reflect the interface of a
//! shader and to reject the mistakes a real driver would reject.

use rink_core::renderer::ShaderStage;
use std::collections::HashMap;

/// Storage qualifier of a global declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// Per-vertex input.
    Attribute,
    /// Per-draw constant.
    Uniform,
    /// Interpolated vertex-to-fragment value.
    Varying,
}

/// One global `attribute`, `uniform` or `varying` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The storage qualifier.
    pub qualifier: Qualifier,
    /// The GLSL type name (`vec4`, `mat4`, `sampler2D`...).
    pub ty: String,
    /// The declared name.
    pub name: String,
    /// `false` if the name never appears outside its declaration, in which
    /// case a driver is free to optimize it away.
    pub referenced: bool,
}

/// The reflected interface of a compiled shader.
#[derive(Debug, Clone)]
pub struct ShaderInterface {
    /// The stage the source was compiled for.
    pub stage: ShaderStage,
    /// Global declarations, in source order.
    pub declarations: Vec<Declaration>,
}

impl ShaderInterface {
    /// Declarations with the given qualifier that survive optimization.
    pub fn active(&self, qualifier: Qualifier) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(move |d| d.qualifier == qualifier && d.referenced)
    }

    fn find(&self, qualifier: Qualifier, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualifier == qualifier && d.name == name)
    }
}

/// An active attribute or uniform of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    /// The variable name.
    pub name: String,
    /// The GLSL type name.
    pub ty: String,
}

/// The reflected interface of a linked program.
#[derive(Debug, Clone, Default)]
pub struct ProgramInterface {
    /// Active attributes; the position in this list is the attribute index.
    pub attributes: Vec<ActiveVariable>,
    /// Active uniforms of both stages, without duplicates.
    pub uniforms: Vec<ActiveVariable>,
}

const PRECISIONS: [&str; 3] = ["lowp", "mediump", "highp"];

/// Compiles `source` for `stage`, returning its interface or a driver-style info log.
pub fn compile(stage: ShaderStage, source: &str) -> Result<ShaderInterface, String> {
    let code = strip_comments(source);
    if code.trim().is_empty() {
        return Err("ERROR: 0:1: '' : syntax error: empty shader source".to_string());
    }

    for (number, line) in code.lines().enumerate() {
        if let Some(message) = line.trim_start().strip_prefix("#error") {
            return Err(format!(
                "ERROR: 0:{}: '#error' : {}",
                number + 1,
                message.trim()
            ));
        }
    }

    let opened = code.matches('{').count();
    let closed = code.matches('}').count();
    if opened != closed {
        return Err(format!(
            "ERROR: 0:{}: '' : syntax error: unbalanced braces ({opened} opened, {closed} closed)",
            code.lines().count()
        ));
    }

    let counts = identifier_counts(&code);
    if !counts.contains_key("main") {
        return Err("ERROR: 0:1: '' : missing function: main".to_string());
    }
    match stage {
        ShaderStage::Vertex if !counts.contains_key("gl_Position") => {
            return Err("ERROR: 0:1: 'gl_Position' : vertex shader never writes gl_Position"
                .to_string());
        }
        ShaderStage::Fragment
            if !counts.contains_key("gl_FragColor") && !counts.contains_key("gl_FragData") =>
        {
            return Err("ERROR: 0:1: 'gl_FragColor' : fragment shader writes no color".to_string());
        }
        _ => {}
    }

    let mut declarations = Vec::new();
    for statement in code.split(';') {
        let statement = statement
            .rsplit(['{', '}'])
            .next()
            .unwrap_or(statement);
        let mut tokens = statement.split_whitespace();
        let qualifier = match tokens.next() {
            Some("attribute") => Qualifier::Attribute,
            Some("uniform") => Qualifier::Uniform,
            Some("varying") => Qualifier::Varying,
            _ => continue,
        };
        if qualifier == Qualifier::Attribute && stage == ShaderStage::Fragment {
            return Err(
                "ERROR: 0:1: 'attribute' : supported in vertex shaders only".to_string(),
            );
        }

        let mut tokens = tokens.skip_while(|t| PRECISIONS.contains(t));
        let Some(ty) = tokens.next() else {
            return Err(format!(
                "ERROR: 0:1: '{}' : syntax error: missing type",
                statement.trim()
            ));
        };
        let names: String = tokens.collect::<Vec<_>>().join(" ");
        for name in names.split(',') {
            let name = name.split('[').next().unwrap_or_default().trim();
            if name.is_empty() {
                return Err(format!(
                    "ERROR: 0:1: '{}' : syntax error: missing name",
                    statement.trim()
                ));
            }
            declarations.push(Declaration {
                qualifier,
                ty: ty.to_string(),
                name: name.to_string(),
                referenced: counts.get(name).copied().unwrap_or(0) > 1,
            });
        }
    }

    Ok(ShaderInterface {
        stage,
        declarations,
    })
}

/// Links a vertex and a fragment interface, returning the program interface
/// or a driver-style info log.
pub fn link(vertex: &ShaderInterface, fragment: &ShaderInterface) -> Result<ProgramInterface, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(format!(
            "ERROR: Linking requires a vertex and a fragment shader, got {} and {}",
            vertex.stage, fragment.stage
        ));
    }

    for input in fragment.active(Qualifier::Varying) {
        match vertex.find(Qualifier::Varying, &input.name) {
            None => {
                return Err(format!(
                    "ERROR: Varying '{}' is read by the fragment shader but not declared by the vertex shader",
                    input.name
                ))
            }
            Some(output) if output.ty != input.ty => {
                return Err(format!(
                    "ERROR: Varying '{}' is '{}' in the vertex shader but '{}' in the fragment shader",
                    input.name, output.ty, input.ty
                ))
            }
            Some(_) => {}
        }
    }

    let mut uniforms: Vec<ActiveVariable> = Vec::new();
    for decl in vertex
        .active(Qualifier::Uniform)
        .chain(fragment.active(Qualifier::Uniform))
    {
        match uniforms.iter().find(|u| u.name == decl.name) {
            Some(existing) if existing.ty != decl.ty => {
                return Err(format!(
                    "ERROR: Uniform '{}' is declared as '{}' and '{}'",
                    decl.name, existing.ty, decl.ty
                ))
            }
            Some(_) => {}
            None => uniforms.push(ActiveVariable {
                name: decl.name.clone(),
                ty: decl.ty.clone(),
            }),
        }
    }

    let attributes = vertex
        .active(Qualifier::Attribute)
        .map(|d| ActiveVariable {
            name: d.name.clone(),
            ty: d.ty.clone(),
        })
        .collect();

    Ok(ProgramInterface {
        attributes,
        uniforms,
    })
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find('\n').unwrap_or(after.len());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix("/*") {
            let end = after.find("*/").map(|i| i + 2).unwrap_or(after.len());
            // Keep line numbering intact.
            out.extend(after[..end].chars().filter(|c| *c == '\n'));
            rest = &after[end..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

fn identifier_counts(code: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in code.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
        if token.is_empty() || token.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "
        uniform mat4 u_Matrix;
        attribute vec4 a_Position;
        attribute vec4 a_Color;
        attribute vec2 a_Unused; // never read
        varying vec4 v_Color;
        void main() {
            v_Color = a_Color;
            gl_Position = u_Matrix * a_Position;
        }";

    const FRAGMENT: &str = "
        precision mediump float;
        varying vec4 v_Color;
        void main() { gl_FragColor = v_Color; }";

    #[test]
    fn reflects_declarations_and_usage() {
        let vs = compile(ShaderStage::Vertex, VERTEX).unwrap();
        let names: Vec<_> = vs.active(Qualifier::Attribute).map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a_Position", "a_Color"]);
        assert!(vs
            .declarations
            .iter()
            .any(|d| d.name == "a_Unused" && !d.referenced));
    }

    #[test]
    fn precision_qualifiers_are_skipped() {
        let fs = compile(
            ShaderStage::Fragment,
            "uniform lowp vec4 u_Color; void main() { gl_FragColor = u_Color; }",
        )
        .unwrap();
        assert_eq!(fs.declarations[0].ty, "vec4");
        assert_eq!(fs.declarations[0].name, "u_Color");
    }

    #[test]
    fn rejects_broken_sources() {
        assert!(compile(ShaderStage::Vertex, "   \n").is_err());
        assert!(compile(ShaderStage::Vertex, "void main() { gl_Position = vec4(0.0);").is_err());
        let log = compile(ShaderStage::Vertex, "#error nope\nvoid main() {}").unwrap_err();
        assert!(log.contains("nope"));
        assert!(compile(
            ShaderStage::Fragment,
            "attribute vec4 a; void main() { gl_FragColor = a; }"
        )
        .is_err());
        assert!(compile(ShaderStage::Fragment, "void main() { }").is_err());
    }

    #[test]
    fn link_checks_varyings() {
        let vs = compile(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, FRAGMENT).unwrap();
        let program = link(&vs, &fs).unwrap();
        assert_eq!(program.attributes.len(), 2);
        assert_eq!(program.uniforms[0].name, "u_Matrix");

        let orphan = compile(
            ShaderStage::Fragment,
            "varying vec4 v_Other; void main() { gl_FragColor = v_Other; }",
        )
        .unwrap();
        let log = link(&vs, &orphan).unwrap_err();
        assert!(log.contains("v_Other"));
    }

    #[test]
    fn comments_do_not_count_as_references() {
        let vs = compile(
            ShaderStage::Vertex,
            "attribute vec4 a_Position;\nattribute vec4 a_Color; /* a_Color */\nvoid main() { gl_Position = a_Position; }",
        )
        .unwrap();
        assert_eq!(vs.active(Qualifier::Attribute).count(), 1);
    }
}
