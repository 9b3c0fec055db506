//! Bundled descriptors for the two toolchain families the original
//! project ships built in (`compilers/gcc.cc`, `compilers/cl.cc`):
//! a GCC-like family producing side-effect `.gcm` BMIs next to the
//! object file, and an MSVC-like family that emits a standalone `.ifc`
//! ahead of compilation.

pub const GCC_LIKE: &str = r#"<compiler>
    <ident compat="gcc" exe="c++" name="GCC" guard="defined(__GNUC__)" version="__GNUC__ __GNUC_MINOR__ __GNUC_PATCHLEVEL__" find-tripple="true"/>
    <bmi-cache dirname="gcm.cache" ext=".gcm" type="side-effect" partitions="true"/>
    <include-dirs output="stderr" start="#include &lt;...&gt; search starts here:" stop="End of search list.">
        <cxx/> -E -Wp,-v -xc++ -
    </include-dirs>
    <rules>
        <rule id="COMPILE">
            <command><cxx/> <var name="DEFINES"/> <var name="CFLAGS"/> <var name="CXXFLAGS"/> -fmodules-ts -c <var name="INPUT"/> -o <var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_EXECUTABLE">
            <command><cxx/> <var name="INPUT"/> -o <var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_STATIC">
            <command>rm -rf <var name="OUTPUT"/></command>
            <command><tool which="ar"/> qc <var name="OUTPUT"/> <var name="LINK_FLAGS"/> <var name="INPUT"/></command>
            <command><tool which="ranlib"/> <var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_SO">
            <command><cxx/> -shared <var name="INPUT"/> -o <var name="OUTPUT"/></command>
        </rule>
    </rules>
</compiler>"#;

pub const CLANG_LIKE: &str = r#"<compiler>
    <ident compat="gcc" exe="clang++" name="Clang" guard="defined(__clang__)" version="__clang_major__ __clang_minor__ __clang_patchlevel__" find-tripple="true"/>
    <bmi-cache dirname="bmi" ext=".pcm" type="side-effect" partitions="false"/>
    <include-dirs output="stderr" start="#include &lt;...&gt; search starts here:" stop="End of search list.">
        <cxx/> -E -Wp,-v -xc++ -
    </include-dirs>
    <rules>
        <rule id="COMPILE">
            <command><cxx/> <var name="DEFINES"/> <var name="CFLAGS"/> <var name="CXXFLAGS"/> -fmodules -c <var name="INPUT"/> -o <var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_EXECUTABLE">
            <command><cxx/> <var name="INPUT"/> -o <var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_STATIC">
            <command>rm -rf <var name="OUTPUT"/></command>
            <command><tool which="ar"/> qc <var name="OUTPUT"/> <var name="LINK_FLAGS"/> <var name="INPUT"/></command>
            <command><tool which="ranlib"/> <var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_SO">
            <command><cxx/> -shared <var name="INPUT"/> -o <var name="OUTPUT"/></command>
        </rule>
    </rules>
</compiler>"#;

pub const CL_LIKE: &str = r#"<compiler>
    <ident compat="cl" exe="cl" name="MSVC" guard="defined(_MSC_VER)" version="_MSC_VER" find-tripple="false"/>
    <bmi-cache dirname="bmi.cache" ext=".ifc" type="direct" partitions="false"/>
    <include-dirs output="stdout" start="" stop="">
        <var name="OUTPUT"/>
    </include-dirs>
    <rules>
        <rule id="EMIT_BMI">
            <command><cxx/> /std:c++20 /interface /TP /c <var name="INPUT"/> /ifcOutput <var name="OUTPUT"/></command>
        </rule>
        <rule id="COMPILE">
            <command><cxx/> <var name="DEFINES"/> <var name="CFLAGS"/> <var name="CXXFLAGS"/> /std:c++20 /c <var name="INPUT"/> /Fo<var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_EXECUTABLE">
            <command>link <var name="INPUT"/> /out:<var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_STATIC">
            <command>lib <var name="INPUT"/> /out:<var name="OUTPUT"/></command>
        </rule>
        <rule id="LINK_SO">
            <command>link /dll <var name="INPUT"/> /out:<var name="OUTPUT"/></command>
        </rule>
    </rules>
</compiler>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{parse_descriptor, BmiKind};

    #[test]
    fn gcc_like_parses_and_uses_side_effect_bmi() {
        let d = parse_descriptor(GCC_LIKE).unwrap();
        assert_eq!(d.ident.name, "GCC");
        assert_eq!(d.bmi.kind, BmiKind::SideEffect);
        assert!(d.bmi.supports_partitions);
    }

    #[test]
    fn clang_like_parses_and_disables_partition_dash() {
        let d = parse_descriptor(CLANG_LIKE).unwrap();
        assert_eq!(d.ident.name, "Clang");
        assert!(!d.bmi.supports_partitions);
        assert_eq!(d.bmi.bmi_path("a.b", "part"), "bmi/a.b.part.pcm");
    }

    #[test]
    fn cl_like_parses_and_uses_standalone_bmi() {
        let d = parse_descriptor(CL_LIKE).unwrap();
        assert_eq!(d.ident.name, "MSVC");
        assert!(d.bmi.is_standalone());
        assert!(d.rules.contains_key(&cxxmod_model::RuleKind::EmitBmi));
    }
}
