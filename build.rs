use std::cmp::Ordering;
use std::env;
use std::process::Command;

// Backends we can build, one per compiled artifact
#[derive(PartialEq, Eq, Debug)]
struct Backend {
    cfg_flag: &'static str,
    arch: &'static str,
    // every name here must be present on the target for the backend to be usable
    cpu_features: &'static [&'static str],
    // cargo feature that has to be switched on, if any
    opt_in: Option<&'static str>,
    detected: bool,
}

impl Backend {
    // Define priority order between backends (Lowest number == Highest Priority)
    fn priority(&self) -> usize {
        match self.cfg_flag {
            "avx512" => 0,
            "sve" => 0,
            "avx2" => 1,
            "neon" => 1,
            _ => usize::MAX, // lowest priority by default
        }
    }

    fn backends() -> Vec<Backend> {
        vec![
            Backend {
                cfg_flag: "avx512",
                arch: "x86_64",
                cpu_features: &["avx512f"],
                opt_in: Some("avx512"),
                detected: false,
            },
            Backend {
                cfg_flag: "avx2",
                arch: "x86_64",
                cpu_features: &["avx2", "fma"],
                opt_in: None,
                detected: false,
            },
            Backend {
                cfg_flag: "sve",
                arch: "aarch64",
                cpu_features: &["sve"],
                opt_in: Some("sve"),
                detected: false,
            },
            Backend {
                cfg_flag: "neon",
                arch: "aarch64",
                cpu_features: &["neon"],
                opt_in: None,
                detected: false,
            },
        ]
    }

    fn opted_in(&self) -> bool {
        match self.opt_in {
            Some(feature) => {
                let var = format!("CARGO_FEATURE_{}", feature.to_uppercase().replace('-', "_"));
                env::var_os(var).is_some()
            }
            None => true,
        }
    }
}

impl Ord for Backend {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for Backend {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Feature detection trait to make implementations more modular
trait CpuFeatureDetector {
    fn has_feature(&self, name: &str) -> bool;
    fn is_applicable(&self) -> bool;
}

// Features the target is compiled with (`-C target-feature`, `-C target-cpu`)
struct TargetFeatures(String);
impl CpuFeatureDetector for TargetFeatures {
    fn has_feature(&self, name: &str) -> bool {
        self.0.split(',').any(|feature| feature == name)
    }

    fn is_applicable(&self) -> bool {
        true
    }
}

// Linux CPU feature detector
struct LinuxDetector(String);
impl LinuxDetector {
    fn new() -> Self {
        let contents = std::fs::read_to_string("/proc/cpuinfo")
            .unwrap_or_default()
            .to_lowercase();
        LinuxDetector(contents)
    }
}

impl CpuFeatureDetector for LinuxDetector {
    fn has_feature(&self, name: &str) -> bool {
        // aarch64 kernels report "asimd" for NEON
        let name = if name == "neon" { "asimd" } else { name };
        self.0
            .split(|c: char| c.is_whitespace())
            .any(|flag| flag == name)
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

// macOS CPU feature detector
struct MacOSDetector(String);
impl MacOSDetector {
    fn new() -> Self {
        let contents = Command::new("sysctl")
            .args(["-a"])
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).to_lowercase())
            .unwrap_or_default();
        MacOSDetector(contents)
    }
}

impl CpuFeatureDetector for MacOSDetector {
    fn has_feature(&self, name: &str) -> bool {
        let key = match name {
            "avx512f" => "hw.optional.avx512f: 1",
            "avx2" => "hw.optional.avx2_0: 1",
            "fma" => "hw.optional.fma: 1",
            "neon" => "hw.optional.neon: 1",
            _ => return false,
        };
        self.0.contains(key)
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

// No windows detector for now, windows hosts rely on the target features only

struct PlatformDetector;
impl PlatformDetector {
    fn host_detector() -> Option<Box<dyn CpuFeatureDetector>> {
        let detectors: Vec<Box<dyn CpuFeatureDetector>> = if cfg!(target_os = "linux") {
            vec![Box::new(LinuxDetector::new())]
        } else if cfg!(target_os = "macos") {
            vec![Box::new(MacOSDetector::new())]
        } else {
            Vec::new()
        };

        detectors.into_iter().find(|detector| detector.is_applicable())
    }

    fn detect(backends: &mut [Backend], target_arch: &str, is_native_build: bool) {
        let target = TargetFeatures(env::var("CARGO_CFG_TARGET_FEATURE").unwrap_or_default());

        // Only look at the host CPU for native builds
        let host = if is_native_build {
            Self::host_detector()
        } else {
            None
        };

        for backend in backends.iter_mut() {
            if backend.arch != target_arch || !backend.opted_in() {
                continue;
            }

            backend.detected = backend.cpu_features.iter().all(|feature| {
                target.has_feature(feature)
                    || host.as_ref().is_some_and(|host| host.has_feature(feature))
            });
        }
    }

    fn choose(backends: &mut [Backend], target_arch: &str) -> &'static str {
        if env::var_os("CARGO_FEATURE_FORCE_FALLBACK").is_some() {
            return "fallback";
        }

        if let Ok(forced) = env::var("VX_BACKEND") {
            let forced = forced.trim().to_lowercase();
            if forced == "fallback" {
                return "fallback";
            }

            return match backends
                .iter()
                .find(|backend| backend.cfg_flag == forced && backend.arch == target_arch)
            {
                Some(backend) => backend.cfg_flag,
                None => panic!("VX_BACKEND={forced} cannot be built for target arch {target_arch}"),
            };
        }

        // Sort backends by priority (highest first)
        backends.sort();

        // Use the highest detected backend, otherwise the portable implementation
        backends
            .iter()
            .find(|backend| backend.detected)
            .map(|backend| backend.cfg_flag)
            .unwrap_or("fallback")
    }

    fn apply(cfg_flag: &str) {
        println!("cargo:rustc-cfg={cfg_flag}");

        for flag in ["avx512", "avx2", "neon", "sve", "fallback"] {
            println!("cargo::rustc-check-cfg=cfg({flag})");
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=VX_BACKEND");

    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    // Determine if we're cross-compiling
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    let is_native_build = host == target;

    let mut backends = Backend::backends();
    PlatformDetector::detect(&mut backends, &target_arch, is_native_build);

    let cfg_flag = PlatformDetector::choose(&mut backends, &target_arch);
    if cfg_flag == "fallback" && matches!(target_arch.as_str(), "x86_64" | "aarch64") {
        println!(
            "cargo:warning=vx: no SIMD backend usable for {target}, \
             building the portable fallback"
        );
    }

    PlatformDetector::apply(cfg_flag);
}
