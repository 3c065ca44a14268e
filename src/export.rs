//! Lay a materialized project out as a standalone framework app.
//!
//! Computes a path-to-content map only. Writing it anywhere is the caller's job.

use serde::Serialize;
use serde_json::json;

use crate::types::Project;

/// Next.js config with defaults.
const NEXT_CONFIG: &str = "/** @type {import('next').NextConfig} */\nconst nextConfig = {}\n\nmodule.exports = nextConfig\n";

/// Root layout the Next.js app router requires.
const NEXT_LAYOUT: &str = "export default function RootLayout({ children }: { children: React.ReactNode }) {\n  \
                           return (\n    <html lang=\"en\">\n      <body>{children}</body>\n    </html>\n  )\n}\n";

/// Vite config enabling the React plugin.
const VITE_CONFIG: &str = "import { defineConfig } from 'vite'\nimport react from '@vitejs/plugin-react'\n\n\
                           export default defineConfig({\n  plugins: [react()],\n})\n";

/// Target framework for an exported project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    /// Create React App: files under `src/`, shim at `src/index.tsx`.
    Cra,
    /// Next.js app router: files under `components/`, shim at `app/page.tsx`.
    #[value(name = "nextjs")]
    NextJs,
    /// Vite: files under `src/`, shim at `src/main.tsx`.
    Vite,
}

impl Framework {
    /// Directory the project files are placed under.
    const fn files_dir(self) -> &'static str {
        return match self {
            Framework::NextJs => "components",
            Framework::Cra | Framework::Vite => "src",
        };
    }

    /// Import rewrites applied to every exported file, as `(from, to)` pairs.
    const fn import_rewrites(self) -> [(&'static str, &'static str); 3] {
        return match self {
            Framework::NextJs => [
                ("/components/", "@/components/"),
                ("/lib/", "@/lib/"),
                ("/utils", "@/lib/utils"),
            ],
            Framework::Cra | Framework::Vite => [
                ("/components/", "./"),
                ("/lib/", "../lib/"),
                ("/utils", "../lib/utils"),
            ],
        };
    }
}

/// Build `package.json` for the framework.
fn package_json(framework: Framework, name: &str, typescript: bool) -> String {
    let mut dependencies = json!({
        "react": "^18.2.0",
        "react-dom": "^18.2.0",
        "lucide-react": "latest",
        "clsx": "latest",
        "tailwind-merge": "latest",
    });
    let (scripts, dev_dependencies) = match framework {
        Framework::Cra => {
            dependencies["react-scripts"] = json!("5.0.1");
            (json!({"start": "react-scripts start", "build": "react-scripts build", "test": "react-scripts test"}), json!({}))
        },
        Framework::NextJs => {
            dependencies["next"] = json!("14.0.0");
            (json!({"dev": "next dev", "build": "next build", "start": "next start"}), json!({}))
        },
        Framework::Vite => (
            json!({"dev": "vite", "build": "vite build", "preview": "vite preview"}),
            json!({"@vitejs/plugin-react": "^4.0.3", "vite": "^4.4.5"}),
        ),
    };

    let mut manifest = json!({
        "name": name,
        "private": true,
        "version": "0.1.0",
        "scripts": scripts,
        "dependencies": dependencies,
        "devDependencies": dev_dependencies,
    });
    if typescript {
        manifest["devDependencies"]["typescript"] = json!("^5");
        manifest["devDependencies"]["@types/react"] = json!("^18");
        manifest["devDependencies"]["@types/react-dom"] = json!("^18");
    }
    if framework == Framework::Vite {
        manifest["type"] = json!("module");
    }

    let mut rendered = serde_json::to_string_pretty(&manifest).unwrap_or_default();
    rendered.push('\n');
    return rendered;
}

/// Rewrite root-absolute import paths for the framework's layout.
///
/// Only `from '...'` and `from "..."` specifiers are touched. Quote style is kept.
pub fn normalize_imports(code: &str, framework: Framework) -> String {
    let mut out = code.to_string();
    for (from, to) in framework.import_rewrites() {
        for quote in ['\'', '"'] {
            for spacing in ["from ", "from"] {
                let needle = format!("{spacing}{quote}{from}");
                out = out.replace(&needle, &format!("{spacing}{quote}{to}"));
            }
        }
    }
    return out;
}

/// Lay out `project` as a `framework` app named `name`.
///
/// Project files move under the framework's source directory with imports rewritten.
/// A `package.json`, the framework's HTML and build config, a `tsconfig.json` for
/// TypeScript projects, and an entry shim that renders the project's entry file are added.
/// Paths in the result have no leading `/`.
pub fn scaffold(project: &Project, framework: Framework, name: &str) -> Vec<(String, String)> {
    let dir = framework.files_dir();
    let typescript = project
        .files()
        .iter()
        .any(|f| return f.path.ends_with(".ts") || f.path.ends_with(".tsx"));

    let mut files = vec![("package.json".to_string(), package_json(framework, name, typescript))];
    for file in project.files() {
        let relative = file.path.trim_start_matches('/');
        files.push((format!("{dir}/{relative}"), normalize_imports(&file.content, framework)));
    }

    files.extend(support_files(framework, name, typescript));

    let entry = project.entry_path.trim_start_matches('/');
    let entry_module = strip_script_extension(entry);
    let (shim_path, shim) = match framework {
        Framework::Cra if typescript => ("src/index.tsx", render_client_shim(entry_module, framework, true)),
        Framework::Cra => ("src/index.js", render_client_shim(entry_module, framework, false)),
        Framework::NextJs => ("app/page.tsx", format!(
            "import GeneratedApp from '@/components/{entry_module}'\n\n\
             export default function Home() {{\n  return <GeneratedApp />\n}}\n"
        )),
        Framework::Vite => ("src/main.tsx", render_client_shim(entry_module, framework, true)),
    };
    files.push((shim_path.to_string(), shim));

    log::debug!("scaffolded {} files for {framework:?}", files.len());
    return files;
}

/// HTML page that hosts the app's `#root` element.
fn render_html(name: &str, script: Option<&str>) -> String {
    let script = script.map_or_else(String::new, |src| {
        return format!("    <script type=\"module\" src=\"{src}\"></script>\n");
    });
    return format!(
        "<!doctype html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    \
         <title>{name}</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n{script}  </body>\n</html>\n"
    );
}

/// Build tooling files the framework needs before `npm install` can start it.
fn support_files(framework: Framework, name: &str, typescript: bool) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = match framework {
        Framework::Cra => vec![("public/index.html".to_string(), render_html(name, None))],
        Framework::NextJs => vec![
            ("next.config.js".to_string(), NEXT_CONFIG.to_string()),
            ("app/layout.tsx".to_string(), NEXT_LAYOUT.to_string()),
        ],
        Framework::Vite => vec![
            ("index.html".to_string(), render_html(name, Some("/src/main.tsx"))),
            ("vite.config.ts".to_string(), VITE_CONFIG.to_string()),
        ],
    };
    if typescript {
        files.push(("tsconfig.json".to_string(), tsconfig(framework)));
    }
    return files;
}

/// `tsconfig.json` suited to the framework's bundler.
fn tsconfig(framework: Framework) -> String {
    let mut options = json!({
        "target": "ES2020",
        "lib": ["dom", "dom.iterable", "esnext"],
        "jsx": "react-jsx",
        "module": "esnext",
        "moduleResolution": "node",
        "strict": true,
        "skipLibCheck": true,
        "esModuleInterop": true,
        "resolveJsonModule": true,
        "isolatedModules": true,
        "noEmit": true,
    });
    match framework {
        Framework::Cra => {},
        Framework::NextJs => {
            options["jsx"] = json!("preserve");
            options["allowJs"] = json!(true);
            options["incremental"] = json!(true);
            options["plugins"] = json!([{"name": "next"}]);
            options["paths"] = json!({"@/*": ["./*"]});
        },
        Framework::Vite => {
            options["moduleResolution"] = json!("bundler");
        },
    }
    let config = json!({ "compilerOptions": options, "include": ["**/*.ts", "**/*.tsx"] });
    let mut rendered = serde_json::to_string_pretty(&config).unwrap_or_default();
    rendered.push('\n');
    return rendered;
}

/// Client-side entry that mounts the generated `App` into `#root`.
/// CRA only compiles TypeScript syntax when the project is TypeScript.
fn render_client_shim(entry_module: &str, framework: Framework, typescript: bool) -> String {
    let mount: String = if framework == Framework::Cra {
        let root = if typescript { "document.getElementById('root') as HTMLElement" } else { "document.getElementById('root')" };
        format!(
            "const root = ReactDOM.createRoot({root});\n\
             root.render(\n  <React.StrictMode>\n    <App />\n  </React.StrictMode>\n);\n"
        )
    } else {
        "ReactDOM.createRoot(document.getElementById('root')!).render(\n  \
         <React.StrictMode>\n    <App />\n  </React.StrictMode>,\n);\n"
            .to_string()
    };
    return format!(
        "import React from 'react';\nimport ReactDOM from 'react-dom/client';\nimport App from './{entry_module}';\n\n{mount}"
    );
}

/// Drop a `.ts`, `.tsx`, `.js`, or `.jsx` extension from a module path.
fn strip_script_extension(path: &str) -> &str {
    for ext in [".tsx", ".ts", ".jsx", ".js"] {
        if let Some(stem) = path.strip_suffix(ext) {
            return stem;
        }
    }
    return path;
}
