//! The reference attribute tree the baseline collection is populated with.

use serde_json::{json, Value};

pub fn reference_attributes() -> Value {
    json!({
        "theme": {
            "primaryTheme": "enterprise-modern",
            "supportedThemes": ["light", "dark"],
            "darkModeSupport": true,
            "colorScheme": "auto"
        },
        "colors": {
            "primary": {
                "50": "#f0f9ff", "100": "#e0f2fe", "200": "#bae6fd", "300": "#7dd3fc",
                "400": "#38bdf8", "500": "#0ea5e9", "600": "#0284c7", "700": "#0369a1",
                "800": "#075985", "900": "#0c4a6e"
            },
            "modules": {
                "ai": {
                    "50": "#e3f2fd", "100": "#bbdefb", "200": "#90caf9", "300": "#64b5f6",
                    "400": "#42a5f5", "500": "#1976d2", "600": "#1565c0", "700": "#0d47a1",
                    "800": "#0a1958", "900": "#061242"
                },
                "nose": {
                    "50": "#e8f5e8", "100": "#c8e6c9", "200": "#a5d6a7", "300": "#81c784",
                    "400": "#66bb6a", "500": "#388e3c", "600": "#2e7d32", "700": "#1b5e20",
                    "800": "#0a4614", "900": "#052910"
                },
                "hunter": {
                    "50": "#fff3e0", "100": "#ffe0b2", "200": "#ffcc02", "300": "#ffb74d",
                    "400": "#ffa726", "500": "#f57c00", "600": "#ef6c00", "700": "#e65100",
                    "800": "#bf360c", "900": "#8f2708"
                }
            },
            "neutrals": {
                "50": "#fafafa", "100": "#f4f4f5", "200": "#e4e4e7", "300": "#d4d4d8",
                "400": "#a1a1aa", "500": "#71717a", "600": "#52525b", "700": "#3f3f46",
                "800": "#27272a", "900": "#18181b", "950": "#09090b"
            },
            "status": {
                "running": "#4ade80",
                "stopped": "#ef4444",
                "warning": "#f59e0b",
                "loading": "#3b82f6",
                "unknown": "#6b7280",
                "success": "#10b981",
                "info": "#06b6d4",
                "error": "#f87171"
            },
            "gradients": {
                "ai": "linear-gradient(135deg, #1976d2 0%, #42a5f5 50%, #90caf9 100%)",
                "nose": "linear-gradient(135deg, #388e3c 0%, #66bb6a 50%, #a5d6a7 100%)",
                "hunter": "linear-gradient(135deg, #f57c00 0%, #ffb74d 50%, #ffcc02 100%)"
            }
        },
        "typography": {
            "fontFamilies": {
                "primary": "Inter",
                "secondary": "Playfair Display",
                "monospace": "Fira Code",
                "display": "Cal Sans"
            },
            "fontSizes": {
                "xs": ["0.75rem", { "lineHeight": "1rem" }],
                "sm": ["0.875rem", { "lineHeight": "1.25rem" }],
                "base": ["1rem", { "lineHeight": "1.5rem" }],
                "lg": ["1.125rem", { "lineHeight": "1.75rem" }],
                "xl": ["1.25rem", { "lineHeight": "1.75rem" }],
                "2xl": ["1.5rem", { "lineHeight": "2rem" }]
            },
            "fontWeights": {
                "light": 300,
                "normal": 400,
                "medium": 500,
                "semibold": 600,
                "bold": 700
            }
        },
        "components": {
            "buttons": {
                "variants": ["primary", "secondary", "outline", "ghost", "ai", "nose", "hunter"],
                "sizes": ["sm", "md", "lg", "xl"],
                "states": ["default", "hover", "active", "disabled", "loading"]
            },
            "cards": {
                "variants": ["default", "glass", "elevated"],
                "themes": ["ai", "nose", "hunter", "neutral"],
                "effects": ["hover-lift", "glow", "scale", "shadow"]
            },
            "inputs": {
                "variants": ["default", "outlined", "filled"],
                "states": ["default", "focus", "error", "disabled"],
                "validation": ["success", "warning", "error"]
            },
            "modals": {
                "sizes": ["sm", "md", "lg", "xl", "full"],
                "animations": ["fade", "scale", "slide"],
                "variants": ["default", "centered", "drawer"]
            },
            "navigation": {
                "types": ["header", "sidebar", "breadcrumb", "tabs"],
                "states": ["default", "active", "disabled"],
                "responsive": ["mobile", "tablet", "desktop"]
            }
        },
        "icons": {
            "libraries": ["Material-UI", "Heroicons", "Lucide React"],
            "categories": {
                "dashboard": ["dashboard", "analytics", "activity"],
                "users": ["users", "person", "user-group"],
                "system": ["settings", "notifications", "cpu"],
                "security": ["security", "shield", "lock"]
            },
            "sizes": ["xs", "sm", "md", "lg", "xl", "2xl"],
            "themes": ["ai", "nose", "hunter", "primary"],
            "animations": ["float", "pulse", "spin", "bounce", "wiggle"]
        },
        "animations": {
            "keyframes": ["float", "pulse", "slideInUp", "fadeIn", "scaleIn", "glow", "wiggle", "shimmer"],
            "utilities": ["animate-fade-in", "animate-fade-in-up", "animate-scale-in", "hover-glow"],
            "durations": ["150ms", "200ms", "300ms", "500ms", "800ms"],
            "easings": ["ease", "ease-in", "ease-out", "ease-in-out"],
            "interactions": ["hover", "focus", "active", "scroll"]
        },
        "layout": {
            "breakpoints": {
                "sm": "640px",
                "md": "768px",
                "lg": "1024px",
                "xl": "1280px",
                "2xl": "1536px"
            },
            "spacing": { "18": "4.5rem", "88": "22rem", "128": "32rem" },
            "borderRadius": { "4xl": "2rem", "5xl": "3rem" },
            "containers": { "screen-minus-nav": "calc(100vh - 4rem)" }
        },
        "accessibility": {
            "colorContrast": { "aa": "supported", "aaa": "partial" },
            "focusManagement": { "focusVisible": true, "focusTrapping": true, "skipLinks": false },
            "keyboardNavigation": { "tabIndex": "managed", "arrowKeys": "supported", "escapeKey": "supported" },
            "screenReaderSupport": { "ariaLabels": true, "semanticHtml": true, "announcements": true },
            "reducedMotion": true
        },
        "technical": {
            "framework": "React 18.3.1",
            "libraries": [
                "Material-UI 5.16.7",
                "Framer Motion 12.23.6",
                "Headless UI 2.2.4",
                "Lucide React 0.525.0"
            ],
            "buildTools": ["Vite 5.4.10"],
            "cssFramework": "TailwindCSS 3.4.14",
            "preprocessors": ["PostCSS 8.4.47", "Autoprefixer 10.4.20"]
        }
    })
}
